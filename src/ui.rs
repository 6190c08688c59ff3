use crate::catalog::Catalog;
use crate::rules::RuleBook;

pub fn render_item_form(catalog: &Catalog, rules: &RuleBook) -> String {
    ITEM_FORM_HTML
        .replace("{{PRODUCT_OPTIONS}}", &product_options(catalog))
        .replace("{{RULES_JSON}}", &rules.to_embedded_json())
}

fn product_options(catalog: &Catalog) -> String {
    let mut html = String::from("<option value=\"\">Choose a category</option>\n");
    let mut current_group: Option<&str> = None;
    for product_type in catalog.types() {
        let group = product_type.top_category();
        if current_group != Some(group) {
            if current_group.is_some() {
                html.push_str("</optgroup>\n");
            }
            html.push_str(&format!("<optgroup label=\"{}\">\n", escape_html(group)));
            current_group = Some(group);
        }
        html.push_str(&format!(
            "<option value=\"{}\">{}</option>\n",
            product_type.id,
            escape_html(&product_type.path)
        ));
    }
    if current_group.is_some() {
        html.push_str("</optgroup>\n");
    }
    html
}

fn escape_html(raw: &str) -> String {
    raw.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#039;")
}

const ITEM_FORM_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>Cosme Expiry</title>
  <style>
    @import url('https://fonts.googleapis.com/css2?family=Space+Grotesk:wght@400;500;600&family=Fraunces:wght@600&display=swap');

    :root {
      --bg-1: #fbf1f4;
      --bg-2: #f3c9d6;
      --ink: #2b2a28;
      --accent: #d3859c;
      --accent-2: #2f4858;
      --card: rgba(255, 255, 255, 0.88);
      --shadow: 0 24px 60px rgba(47, 72, 88, 0.16);
    }

    * {
      box-sizing: border-box;
    }

    body {
      margin: 0;
      min-height: 100vh;
      background: radial-gradient(circle at top, var(--bg-2), transparent 60%),
        linear-gradient(135deg, var(--bg-1), #fde8ee 60%, #f9f2f4 100%);
      color: var(--ink);
      font-family: "Space Grotesk", "Trebuchet MS", sans-serif;
      display: grid;
      place-items: center;
      padding: 32px 18px 48px;
    }

    .app {
      width: min(860px, 100%);
      background: var(--card);
      backdrop-filter: blur(12px);
      border-radius: 28px;
      box-shadow: var(--shadow);
      padding: 36px;
      display: grid;
      gap: 28px;
    }

    header {
      display: flex;
      align-items: flex-start;
      justify-content: space-between;
      gap: 16px;
    }

    h1 {
      font-family: "Fraunces", "Georgia", serif;
      font-weight: 600;
      font-size: clamp(2rem, 4vw, 2.6rem);
      margin: 0;
    }

    h2 {
      margin: 0;
      font-size: 1.3rem;
    }

    .subtitle {
      margin: 6px 0 0;
      color: #5f5c57;
    }

    .badge {
      background: var(--accent);
      color: white;
      border-radius: 999px;
      padding: 4px 12px;
      font-weight: 600;
    }

    .hidden {
      display: none;
    }

    .buckets {
      display: flex;
      flex-wrap: wrap;
      gap: 8px;
      font-size: 0.85rem;
      color: #6b645d;
    }

    form {
      display: grid;
      grid-template-columns: repeat(auto-fit, minmax(240px, 1fr));
      gap: 16px;
    }

    label {
      display: grid;
      gap: 6px;
      font-size: 0.85rem;
      text-transform: uppercase;
      letter-spacing: 0.08em;
      color: #8b857d;
    }

    input, select, textarea {
      font: inherit;
      padding: 10px 12px;
      border-radius: 12px;
      border: 1px solid rgba(47, 72, 88, 0.18);
      background: white;
      color: var(--ink);
      text-transform: none;
      letter-spacing: normal;
    }

    .wide {
      grid-column: 1 / -1;
    }

    button {
      appearance: none;
      border: none;
      border-radius: 999px;
      padding: 12px 18px;
      font-size: 1rem;
      font-weight: 600;
      cursor: pointer;
      background: var(--accent-2);
      color: white;
    }

    button[disabled] {
      opacity: 0.6;
      cursor: progress;
    }

    .btn-save {
      background: var(--accent);
    }

    #suggest-list {
      list-style: none;
      margin: 0;
      padding: 0;
      display: grid;
      gap: 6px;
    }

    #suggest-list li {
      display: flex;
      align-items: center;
      justify-content: space-between;
      gap: 12px;
    }

    .chart {
      display: grid;
      grid-template-columns: repeat(5, 1fr);
      align-items: end;
      gap: 12px;
      height: 200px;
    }

    .bar {
      border-radius: 8px 8px 0 0;
      min-height: 2px;
      position: relative;
    }

    .bar span {
      position: absolute;
      top: -1.4em;
      width: 100%;
      text-align: center;
      font-weight: 600;
    }

    .bar-labels {
      display: grid;
      grid-template-columns: repeat(5, 1fr);
      gap: 12px;
      text-align: center;
      font-size: 0.85rem;
      color: #6c757d;
    }

    .status {
      font-size: 0.95rem;
      color: #6b645d;
      min-height: 1.2em;
    }

    .status[data-type="error"] {
      color: #c63b2b;
    }

    .status[data-type="ok"] {
      color: #2d7a4b;
    }
  </style>
</head>
<body>
  <main class="app">
    <header>
      <div>
        <h1>Cosme Expiry</h1>
        <p class="subtitle">Register what you opened; the expiry date follows the category.</p>
      </div>
      <div>
        <span id="notificationBadge" class="badge hidden">0</span>
        <div class="buckets">
          <span>expired <b id="notifCountExpired">0</b></span>
          <span>7d <b id="notifCountWeek">0</b></span>
          <span>14d <b id="notifCountBiweek">0</b></span>
          <span>30d <b id="notifCountMonth">0</b></span>
        </div>
      </div>
    </header>

    <form id="item-form">
      <label>Name
        <input id="name" name="name" required />
      </label>
      <label>Brand
        <input id="brand" name="brand" />
      </label>
      <div id="ai-suggest" class="wide" data-api-url="/api/suggest">
        <button type="button" id="btn-suggest">Suggest category</button>
        <ul id="suggest-list"></ul>
      </div>
      <label class="wide">Category
        <select id="id_product_type" name="product_type" required>
{{PRODUCT_OPTIONS}}        </select>
      </label>
      <label>Opened on
        <input type="date" id="id_opened_on" name="opened_on" required />
      </label>
      <label>Expires on
        <input type="date" id="id_expires_on" name="expires_on" required />
      </label>
      <label>Colour
        <input id="color_code" name="color_code" />
      </label>
      <label class="wide">Memo
        <textarea id="memo" name="memo" rows="3"></textarea>
      </label>
      <button class="btn-save wide" type="submit">Save item</button>
    </form>
    <div id="status" class="status" aria-live="polite"></div>

    <section>
      <h2>Items by expiry</h2>
      <div class="chart" id="expiryChart"></div>
      <div class="bar-labels">
        <span>Expired</span><span>7 days</span><span>14 days</span><span>30 days</span><span>Safe</span>
      </div>
    </section>
  </main>

  <script type="application/json" id="taxon-rules">{{RULES_JSON}}</script>
  <script>
    const statusEl = document.getElementById('status');
    const setStatus = (message, type) => {
      statusEl.textContent = message;
      statusEl.dataset.type = type || '';
    };

    const escapeHtml = (str) => String(str)
      .replaceAll('&', '&amp;')
      .replaceAll('<', '&lt;')
      .replaceAll('>', '&gt;')
      .replaceAll('"', '&quot;')
      .replaceAll("'", '&#039;');

    // expiry auto calculation
    const loadRules = () => {
      const el = document.getElementById('taxon-rules');
      if (!el) return {};
      try {
        return JSON.parse(el.textContent);
      } catch {
        return {};
      }
    };

    const pad = (n) => String(n).padStart(2, '0');
    const lastDayOfMonth = (y, m) => new Date(y, m, 0).getDate();
    const parseYMD = (s) => {
      if (!/^\d{4}-\d{2}-\d{2}$/.test(s || '')) return null;
      const [yy, mm, dd] = s.split('-').map(Number);
      const dt = new Date(yy, mm - 1, dd);
      if (dt.getFullYear() !== yy || dt.getMonth() + 1 !== mm || dt.getDate() !== dd) return null;
      return dt;
    };
    const toYMD = (d) => `${d.getFullYear()}-${pad(d.getMonth() + 1)}-${pad(d.getDate())}`;
    const computeExpiry = (opened, months, anchor) => {
      const total = opened.getMonth() + 1 + months;
      const year = opened.getFullYear() + Math.floor((total - 1) / 12);
      const month = ((total - 1) % 12) + 1;
      const last = lastDayOfMonth(year, month);
      const day = anchor === 'end_of_month' || !anchor ? last : Math.min(opened.getDate(), last);
      return new Date(year, month - 1, day);
    };

    const productSel = document.getElementById('id_product_type');
    const openedInput = document.getElementById('id_opened_on');
    const expiresInput = document.getElementById('id_expires_on');

    const validateDates = () => {
      const opened = parseYMD(openedInput.value);
      const expires = parseYMD(expiresInput.value);
      expiresInput.setCustomValidity(
        opened && expires && opened > expires ? 'Expiry must be on or after the opened date' : ''
      );
    };

    const setupExpiry = () => {
      const rules = loadRules();
      if (!productSel || !openedInput || !expiresInput) {
        console.warn('[expiry] inputs not found');
        return;
      }
      const update = () => {
        const rule = rules[productSel.value];
        const opened = parseYMD(openedInput.value);
        if (!rule || !opened) return;
        expiresInput.value = toYMD(computeExpiry(opened, Number(rule.months) || 0, rule.anchor));
        expiresInput.dispatchEvent(new Event('change', { bubbles: true }));
        expiresInput.dispatchEvent(new Event('input', { bubbles: true }));
      };
      productSel.addEventListener('change', update);
      openedInput.addEventListener('change', update);
      openedInput.addEventListener('input', update);
      openedInput.addEventListener('change', validateDates);
      expiresInput.addEventListener('change', validateDates);
      update();
    };

    // category suggestion
    const aiBox = document.getElementById('ai-suggest');
    const btnSuggest = document.getElementById('btn-suggest');
    const listSuggest = document.getElementById('suggest-list');

    const fetchCandidates = async () => {
      btnSuggest.disabled = true;
      const oldText = btnSuggest.textContent;
      btnSuggest.textContent = 'Looking...';
      try {
        const res = await fetch(aiBox.dataset.apiUrl, {
          method: 'POST',
          headers: { 'content-type': 'application/json' },
          body: JSON.stringify({
            name: document.getElementById('name').value.trim(),
            brand: document.getElementById('brand').value.trim()
          })
        });
        if (!res.ok) throw new Error(`HTTP ${res.status}`);
        const data = await res.json();
        const candidates = Array.isArray(data.candidates) ? data.candidates : [];
        listSuggest.innerHTML = candidates.length
          ? candidates.map((c) => `
              <li><strong>${escapeHtml(c.path)}</strong>
                <button type="button" class="pick" data-id="${c.taxon_id}">Use</button></li>`).join('')
          : '<li>No matching category</li>';
      } catch (err) {
        console.error(err);
        listSuggest.innerHTML = '<li>Suggestion failed, try again later.</li>';
      } finally {
        btnSuggest.disabled = false;
        btnSuggest.textContent = oldText;
      }
    };

    const adoptCandidate = (taxonId) => {
      const val = String(taxonId);
      const opt = Array.from(productSel.options).find((o) => o.value === val);
      if (!opt) {
        console.warn('[suggest] no option for', val);
        return;
      }
      productSel.value = val;
      productSel.dispatchEvent(new Event('input', { bubbles: true }));
      productSel.dispatchEvent(new Event('change', { bubbles: true }));
    };

    if (aiBox && btnSuggest) {
      btnSuggest.addEventListener('click', fetchCandidates);
      listSuggest.addEventListener('click', (event) => {
        const btn = event.target.closest('.pick');
        if (btn) adoptCandidate(btn.dataset.id);
      });
    }

    // notification badges
    const setCount = (id, count) => {
      const el = document.getElementById(id);
      if (el) el.textContent = count;
    };
    const loadNotifications = async () => {
      const res = await fetch('/api/notifications/summary');
      if (!res.ok) throw new Error('Unable to load notifications');
      const data = await res.json();
      const badge = document.getElementById('notificationBadge');
      badge.textContent = data.total_unread;
      badge.classList.toggle('hidden', data.total_unread === 0);
      setCount('notifCountExpired', data.buckets.expired);
      setCount('notifCountWeek', data.buckets.week);
      setCount('notifCountBiweek', data.buckets.biweek);
      setCount('notifCountMonth', data.buckets.month);
    };

    // expiry chart
    const chartEl = document.getElementById('expiryChart');
    const colors = ['#B91C1C', '#FDE047', '#FB923C', '#22C55E', '#0dcaf0'];
    const renderChart = (stats) => {
      const values = [stats.expired, stats.week, stats.biweek, stats.month, stats.safe];
      const max = Math.max(1, ...values);
      chartEl.innerHTML = values.map((value, i) => `
        <div class="bar" style="height:${(value / max) * 100}%;background:${colors[i]}">
          <span>${value > 0 ? value : ''}</span>
        </div>`).join('');
    };
    const loadStats = async () => {
      const res = await fetch('/api/expiry-stats');
      if (!res.ok) throw new Error('Unable to load stats');
      renderChart(await res.json());
    };

    document.getElementById('item-form').addEventListener('submit', async (event) => {
      event.preventDefault();
      const form = new FormData(event.target);
      setStatus('Saving...', 'info');
      try {
        const res = await fetch('/api/items', {
          method: 'POST',
          headers: { 'content-type': 'application/json' },
          body: JSON.stringify(Object.fromEntries(form.entries()))
        });
        if (!res.ok) throw new Error((await res.text()) || 'Request failed');
        const item = await res.json();
        setStatus(`Saved, expires on ${item.expires_on}`, 'ok');
        event.target.reset();
        await Promise.all([loadStats(), loadNotifications()]);
      } catch (err) {
        setStatus(err.message, 'error');
      }
    });

    setupExpiry();
    Promise.all([loadStats(), loadNotifications()]).catch((err) => setStatus(err.message, 'error'));
  </script>
</body>
</html>
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_embeds_rules_and_options() {
        let catalog = Catalog::builtin();
        let html = render_item_form(&catalog, &catalog.rule_book());
        assert!(html.contains(r#"<script type="application/json" id="taxon-rules">{"#));
        assert!(html.contains(r#""113":{"months":3,"anchor":"preserve_day"}"#));
        assert!(html.contains(r#"<option value="113">Makeup &gt; Eye &gt; Mascara</option>"#));
        assert!(html.contains(r#"<optgroup label="Skincare">"#));
        assert!(!html.contains("{{"));
    }

    #[test]
    fn page_does_not_leak_source_paths() {
        let catalog = Catalog::builtin();
        let html = render_item_form(&catalog, &catalog.rule_book());
        assert!(!html.contains("src/"));
        assert!(!html.contains(".rs"));
    }

    #[test]
    fn escapes_markup() {
        assert_eq!(escape_html(r#"<b>"x" & 'y'</b>"#), "&lt;b&gt;&quot;x&quot; &amp; &#039;y&#039;&lt;/b&gt;");
    }
}
