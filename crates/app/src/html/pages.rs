pub const HOME_HTML: &str = r#"<!doctype html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>Face Count Detector</title>
  <link rel="stylesheet" href="https://cdnjs.cloudflare.com/ajax/libs/font-awesome/6.5.1/css/all.min.css"
    crossorigin="anonymous" referrerpolicy="no-referrer" />
  <style>
    :root { --bg: #0b1220; --panel: #131c2e; --accent: #38bdf8; --ok: #4ade80; --text: #e2e8f0; }
    * { box-sizing: border-box; }
    body { margin: 0; font-family: system-ui, sans-serif; background: var(--bg); color: var(--text); }
    nav { display: flex; justify-content: space-between; align-items: center; padding: 1rem 2rem; background: var(--panel); }
    nav a { color: var(--text); text-decoration: none; margin-left: 1.25rem; }
    nav a:hover, nav a.active { color: var(--accent); }
    .nav-toggle { display: none; background: none; border: 0; color: var(--text); font-size: 1.25rem; }
    .nav-menu { display: flex; }
    main { max-width: 960px; margin: 0 auto; padding: 3rem 1.5rem; }
    .hero h1 { font-size: 2.5rem; margin-bottom: 0.5rem; }
    .btn { display: inline-block; padding: 0.75rem 1.5rem; border-radius: 8px; background: var(--accent); color: #04101f; font-weight: 600; text-decoration: none; }
    .features { display: grid; grid-template-columns: repeat(auto-fit, minmax(220px, 1fr)); gap: 1rem; margin-top: 3rem; }
    .feature { background: var(--panel); border-radius: 10px; padding: 1.25rem; }
    .feature i { color: var(--ok); font-size: 1.5rem; }
    @media (max-width: 640px) { .nav-toggle { display: block; } .nav-menu { display: none; flex-direction: column; } }
  </style>
</head>
<body>
  <nav>
    <strong><i class="fas fa-user-friends"></i> Face Count Detector</strong>
    <button class="nav-toggle" aria-label="Menu"><i class="fas fa-bars"></i></button>
    <div class="nav-menu">
      <a href="/" class="active">Home</a>
      <a href="/detection">Detection</a>
      <a href="/about">About</a>
      <a href="/contact">Contact</a>
    </div>
  </nav>
  <main>
    <section class="hero">
      <h1>Count faces in real time</h1>
      <p>Stream your webcam, watch every detected face outlined live, and get a running count of the people in view.</p>
      <a class="btn" href="/detection"><i class="fas fa-video"></i> Start detecting</a>
    </section>
    <section class="features">
      <div class="feature"><i class="fas fa-bolt"></i><h3>Live stream</h3><p>Annotated frames are pushed to the browser as an MJPEG feed.</p></div>
      <div class="feature"><i class="fas fa-vector-square"></i><h3>Face boxes</h3><p>Each face gets a rectangle and a number ordered top to bottom.</p></div>
      <div class="feature"><i class="fas fa-chart-line"></i><h3>Face count</h3><p>The detection page polls the current count once per second.</p></div>
    </section>
  </main>
  <script src="/static/js/script.js"></script>
</body>
</html>
"#;

pub const ABOUT_HTML: &str = r#"<!doctype html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>About - Face Count Detector</title>
  <style>
    body { margin: 0; font-family: system-ui, sans-serif; background: #0b1220; color: #e2e8f0; }
    nav { display: flex; gap: 1.25rem; padding: 1rem 2rem; background: #131c2e; }
    nav a { color: #e2e8f0; text-decoration: none; }
    nav a.active { color: #38bdf8; }
    main { max-width: 760px; margin: 0 auto; padding: 3rem 1.5rem; line-height: 1.6; }
    dt { font-weight: 600; margin-top: 1rem; }
  </style>
</head>
<body>
  <nav class="nav-menu">
    <a href="/">Home</a>
    <a href="/detection">Detection</a>
    <a href="/about" class="active">About</a>
    <a href="/contact">Contact</a>
  </nav>
  <main>
    <h1>About</h1>
    <p>Face Count Detector captures frames from a local webcam, runs a Haar cascade frontal face
      classifier on each frame, and streams the annotated result to your browser.</p>
    <dl>
      <dt>Detection</dt>
      <dd>Frames are converted to grayscale and histogram equalized before the cascade scans them
        at multiple scales.</dd>
      <dt>Classifier</dt>
      <dd>The cascade file is read from the local models directory and downloaded once when missing.</dd>
      <dt>Privacy</dt>
      <dd>Frames never leave the machine running the server. Nothing is recorded.</dd>
    </dl>
  </main>
</body>
</html>
"#;

pub const CONTACT_HTML: &str = r#"<!doctype html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>Contact - Face Count Detector</title>
  <link rel="stylesheet" href="https://cdnjs.cloudflare.com/ajax/libs/font-awesome/6.5.1/css/all.min.css"
    crossorigin="anonymous" referrerpolicy="no-referrer" />
  <style>
    body { margin: 0; font-family: system-ui, sans-serif; background: #0b1220; color: #e2e8f0; }
    nav { display: flex; gap: 1.25rem; padding: 1rem 2rem; background: #131c2e; }
    nav a { color: #e2e8f0; text-decoration: none; }
    nav a.active { color: #38bdf8; }
    main { max-width: 640px; margin: 0 auto; padding: 3rem 1.5rem; }
    label { display: block; margin-top: 1rem; }
    input, textarea { width: 100%; padding: 0.6rem; border-radius: 6px; border: 1px solid #334155; background: #131c2e; color: inherit; }
    button { margin-top: 1.5rem; padding: 0.75rem 1.5rem; border: 0; border-radius: 8px; background: #38bdf8; color: #04101f; font-weight: 600; }
  </style>
</head>
<body>
  <nav class="nav-menu">
    <a href="/">Home</a>
    <a href="/detection">Detection</a>
    <a href="/about">About</a>
    <a href="/contact" class="active">Contact</a>
  </nav>
  <main>
    <h1>Contact</h1>
    <form id="contactForm">
      <label for="name">Name</label>
      <input id="name" name="name" type="text" />
      <label for="email">Email</label>
      <input id="email" name="email" type="email" />
      <label for="subject">Subject</label>
      <input id="subject" name="subject" type="text" />
      <label for="message">Message</label>
      <textarea id="message" name="message" rows="5"></textarea>
      <button type="submit"><i class="fas fa-paper-plane"></i> Send</button>
    </form>
  </main>
  <script src="/static/js/script.js"></script>
</body>
</html>
"#;
