use crate::models::{Frequency, Permission, ReminderSettings};

pub fn render_index(settings: &ReminderSettings, permission: Permission) -> String {
    let mut page = INDEX_HTML
        .replace(
            "{{ENABLED_CHECKED}}",
            if settings.enabled { "checked" } else { "" },
        )
        .replace("{{TIME}}", &settings.time.format("%H:%M").to_string())
        .replace(
            "{{DAILY_SELECTED}}",
            if settings.frequency == Frequency::Daily {
                "selected"
            } else {
                ""
            },
        )
        .replace(
            "{{WEEKLY_SELECTED}}",
            if settings.frequency == Frequency::Weekly {
                "selected"
            } else {
                ""
            },
        )
        .replace("{{PERMISSION}}", permission_label(permission));

    for day in 0u8..7 {
        let marker = format!("{{{{DAY_{day}_CHECKED}}}}");
        let value = if settings.days_of_week.contains(&day) {
            "checked"
        } else {
            ""
        };
        page = page.replace(&marker, value);
    }

    page
}

fn permission_label(permission: Permission) -> &'static str {
    match permission {
        Permission::Granted => "granted",
        Permission::Denied => "denied",
        Permission::Default => "default",
    }
}

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>Pain Diary Reminders</title>
  <style>
    :root {
      --bg: #f6f2ee;
      --ink: #2b2a28;
      --accent: #7c5cbf;
      --card: #ffffff;
      --muted: #6f6a65;
      --warn: #b4541f;
    }

    * { box-sizing: border-box; }

    body {
      margin: 0;
      min-height: 100vh;
      background: var(--bg);
      color: var(--ink);
      font-family: "Segoe UI", "Trebuchet MS", sans-serif;
      display: grid;
      place-items: start center;
      padding: 40px 16px;
    }

    .app {
      width: min(560px, 100%);
      background: var(--card);
      border-radius: 18px;
      box-shadow: 0 16px 40px rgba(60, 50, 90, 0.14);
      padding: 28px;
      display: grid;
      gap: 20px;
    }

    h1 { margin: 0; font-size: 1.6rem; }
    .subtitle { margin: 0; color: var(--muted); font-size: 0.95rem; }

    .field { display: grid; gap: 6px; }
    .field label { font-size: 0.85rem; color: var(--muted); }
    .field input[type="time"], .field select {
      padding: 8px 10px;
      border: 1px solid rgba(60, 50, 90, 0.25);
      border-radius: 8px;
      font-size: 1rem;
    }

    .toggle { display: flex; align-items: center; gap: 10px; }

    .days { display: flex; flex-wrap: wrap; gap: 10px; }
    .days label {
      display: flex;
      align-items: center;
      gap: 4px;
      font-size: 0.9rem;
    }

    .banner {
      border-radius: 10px;
      padding: 10px 12px;
      font-size: 0.9rem;
      background: rgba(124, 92, 191, 0.1);
    }
    .banner[data-permission="denied"],
    .banner[data-permission="default"] { color: var(--warn); }

    button {
      appearance: none;
      border: none;
      border-radius: 999px;
      padding: 12px 18px;
      font-size: 1rem;
      font-weight: 600;
      cursor: pointer;
      background: var(--accent);
      color: white;
    }
    button.secondary { background: #e8e2f5; color: var(--accent); }

    .actions { display: flex; gap: 12px; }

    .status { min-height: 1.2em; font-size: 0.9rem; color: var(--muted); }
    .status[data-type="error"] { color: #c63b2b; }
    .status[data-type="ok"] { color: #2d7a4b; }

    .events { display: grid; gap: 8px; }
    .events h2 { margin: 0; font-size: 1.1rem; }
    .events ul { margin: 0; padding-left: 18px; color: var(--muted); font-size: 0.9rem; }
  </style>
</head>
<body>
  <main class="app">
    <header>
      <h1>Reminders</h1>
      <p class="subtitle">Get a nudge to log your pain entries.</p>
    </header>

    <div class="banner" id="permission" data-permission="{{PERMISSION}}">
      Notification permission: <strong id="permission-value">{{PERMISSION}}</strong>
    </div>

    <div class="field toggle">
      <input type="checkbox" id="enabled" {{ENABLED_CHECKED}} />
      <label for="enabled">Remind me to log entries</label>
    </div>

    <div class="field">
      <label for="time">Time of day</label>
      <input type="time" id="time" value="{{TIME}}" />
    </div>

    <div class="field">
      <label for="frequency">Frequency</label>
      <select id="frequency">
        <option value="daily" {{DAILY_SELECTED}}>Every day</option>
        <option value="weekly" {{WEEKLY_SELECTED}}>Selected weekdays</option>
      </select>
    </div>

    <div class="field" id="days-field">
      <label>Days of the week</label>
      <div class="days">
        <label><input type="checkbox" data-day="0" {{DAY_0_CHECKED}} />Sun</label>
        <label><input type="checkbox" data-day="1" {{DAY_1_CHECKED}} />Mon</label>
        <label><input type="checkbox" data-day="2" {{DAY_2_CHECKED}} />Tue</label>
        <label><input type="checkbox" data-day="3" {{DAY_3_CHECKED}} />Wed</label>
        <label><input type="checkbox" data-day="4" {{DAY_4_CHECKED}} />Thu</label>
        <label><input type="checkbox" data-day="5" {{DAY_5_CHECKED}} />Fri</label>
        <label><input type="checkbox" data-day="6" {{DAY_6_CHECKED}} />Sat</label>
      </div>
    </div>

    <div class="actions">
      <button id="save" type="button">Save</button>
      <button id="test" type="button" class="secondary">Send test notification</button>
    </div>

    <div class="status" id="status"></div>

    <section class="events">
      <h2>Recent reminders</h2>
      <ul id="events"><li>None yet.</li></ul>
    </section>
  </main>

  <script>
    const statusEl = document.getElementById('status');
    const eventsEl = document.getElementById('events');
    const permissionEl = document.getElementById('permission');
    const daysField = document.getElementById('days-field');
    const frequencyEl = document.getElementById('frequency');

    const setStatus = (message, type) => {
      statusEl.textContent = message;
      statusEl.dataset.type = type || '';
    };

    const toggleDays = () => {
      daysField.style.display = frequencyEl.value === 'weekly' ? '' : 'none';
    };
    frequencyEl.addEventListener('change', toggleDays);
    toggleDays();

    const collectSettings = () => {
      const time = document.getElementById('time').value;
      return {
        enabled: document.getElementById('enabled').checked,
        time: time.length === 5 ? time + ':00' : time,
        frequency: frequencyEl.value,
        daysOfWeek: Array.from(document.querySelectorAll('[data-day]'))
          .filter((box) => box.checked)
          .map((box) => Number(box.dataset.day))
      };
    };

    const applyStatus = (data) => {
      permissionEl.dataset.permission = data.permission;
      document.getElementById('permission-value').textContent = data.permission;
      if (data.nextOccurrence) {
        setStatus('Next reminder: ' + data.nextOccurrence.replace('T', ' '), 'ok');
      }
    };

    const save = async () => {
      setStatus('Saving...', '');
      const res = await fetch('/api/reminders', {
        method: 'PUT',
        headers: { 'content-type': 'application/json' },
        body: JSON.stringify(collectSettings())
      });
      if (!res.ok) {
        throw new Error(await res.text() || 'Unable to save settings');
      }
      const data = await res.json();
      applyStatus(data);
      if (!data.settings.enabled) {
        setStatus('Reminders are off', 'ok');
      }
    };

    const sendTest = async () => {
      const res = await fetch('/api/reminders/test', { method: 'POST' });
      if (!res.ok) {
        throw new Error('Unable to send test notification');
      }
      const data = await res.json();
      permissionEl.dataset.permission = data.permission;
      if (data.permission !== 'granted') {
        setStatus('Allow notifications first (permission: ' + data.permission + ')', 'error');
      } else {
        setStatus('Test notification sent', 'ok');
      }
    };

    const loadEvents = async () => {
      const res = await fetch('/api/reminders/events');
      if (!res.ok) return;
      const events = await res.json();
      if (!events.length) return;
      eventsEl.innerHTML = events
        .map((event) => `<li>${event.timestamp.replace('T', ' ')} — ${event.body}</li>`)
        .join('');
    };

    const reportVisible = () => {
      fetch('/api/reminders/visibility', { method: 'POST' }).catch(() => {});
    };

    document.getElementById('save').addEventListener('click', () => {
      save().catch((err) => setStatus(err.message, 'error'));
    });
    document.getElementById('test').addEventListener('click', () => {
      sendTest().catch((err) => setStatus(err.message, 'error'));
    });
    document.addEventListener('visibilitychange', () => {
      if (!document.hidden) {
        reportVisible();
        loadEvents().catch(() => {});
      }
    });

    reportVisible();
    loadEvents().catch(() => {});
    setInterval(() => loadEvents().catch(() => {}), 30000);
  </script>
</body>
</html>
"#;
