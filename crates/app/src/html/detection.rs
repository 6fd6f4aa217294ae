pub const DETECTION_HTML: &str = r#"<!doctype html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>Live Detection - Face Count Detector</title>
  <link rel="stylesheet" href="https://cdnjs.cloudflare.com/ajax/libs/font-awesome/6.5.1/css/all.min.css"
    crossorigin="anonymous" referrerpolicy="no-referrer" />
  <style>
    :root { --bg: #0b1220; --panel: #131c2e; --accent: #38bdf8; --ok: #4ade80; --danger: #fb7185; --text: #e2e8f0; }
    body { margin: 0; font-family: system-ui, sans-serif; background: var(--bg); color: var(--text); }
    nav { display: flex; gap: 1.25rem; padding: 1rem 2rem; background: var(--panel); }
    nav a { color: var(--text); text-decoration: none; }
    nav a.active { color: var(--accent); }
    main { display: grid; grid-template-columns: minmax(0, 2fr) minmax(0, 1fr); gap: 1.5rem; max-width: 1200px; margin: 0 auto; padding: 2rem 1.5rem; }
    .webcam-container { position: relative; background: #000; border-radius: 12px; overflow: hidden; aspect-ratio: 4 / 3; }
    #webcamFeed { display: none; width: 100%; height: 100%; object-fit: contain; }
    #webcamPlaceholder { display: flex; flex-direction: column; align-items: center; justify-content: center; height: 100%; color: #64748b; }
    .controls { display: flex; gap: 0.75rem; margin-top: 1rem; }
    .controls button { padding: 0.7rem 1.4rem; border: 0; border-radius: 8px; font-weight: 600; cursor: pointer; }
    #startCamera { background: var(--ok); color: #04101f; }
    #stopCamera { background: var(--danger); color: #04101f; }
    button:disabled { opacity: 0.5; cursor: default; }
    .panel { background: var(--panel); border-radius: 12px; padding: 1.25rem; margin-bottom: 1rem; }
    .count { font-size: 3rem; font-weight: 700; color: var(--accent); }
    .status { display: flex; align-items: center; gap: 0.5rem; }
    #statusDot { width: 10px; height: 10px; border-radius: 50%; background: var(--danger); }
    #statusDot.active { background: var(--ok); }
    .face-item { display: flex; justify-content: space-between; padding: 0.4rem 0; border-bottom: 1px solid #1e293b; }
    .modal { display: none; position: fixed; inset: 0; background: rgba(2, 6, 23, 0.75); align-items: center; justify-content: center; z-index: 1000; }
    .modal > div { background: var(--panel); padding: 1.5rem 2rem; border-radius: 12px; max-width: 420px; }
    @media (max-width: 900px) { main { grid-template-columns: 1fr; } }
  </style>
</head>
<body>
  <nav class="nav-menu">
    <a href="/">Home</a>
    <a href="/detection" class="active">Detection</a>
    <a href="/about">About</a>
    <a href="/contact">Contact</a>
  </nav>
  <main>
    <section>
      <div class="webcam-container">
        <img id="webcamFeed" src="/video_feed" alt="Live webcam feed" />
        <div id="webcamPlaceholder"><i class="fas fa-video-slash fa-3x"></i><p>Camera not active</p></div>
      </div>
      <div class="controls">
        <button id="startCamera"><i class="fas fa-play"></i> Start Camera</button>
        <button id="stopCamera" disabled><i class="fas fa-stop"></i> Stop Camera</button>
      </div>
    </section>
    <aside>
      <div class="panel">
        <div class="status"><span id="statusDot"></span><span id="statusText">Camera Offline</span></div>
        <p>Camera: <strong id="cameraStatus">Offline</strong></p>
        <p>Detection: <strong id="detectionStatus">Inactive</strong></p>
      </div>
      <div class="panel">
        <div>Faces in view</div>
        <div class="count" id="faceCount">0</div>
      </div>
      <div class="panel" id="resultsPanel" style="display: none">
        <h3>Detected faces</h3>
        <div id="facesList"></div>
      </div>
    </aside>
  </main>
  <div class="modal" id="loadingModal"><div><i class="fas fa-spinner fa-spin"></i> Starting camera...</div></div>
  <div class="modal" id="errorModal">
    <div>
      <h3><i class="fas fa-exclamation-triangle"></i> Error</h3>
      <p id="errorMessage"></p>
      <button id="errorClose">Close</button>
    </div>
  </div>
  <script src="/static/js/script.js"></script>
</body>
</html>
"#;

pub const SCRIPT_JS: &str = r#"(() => {
  const $ = (id) => document.getElementById(id);

  function notify(message, kind) {
    const note = document.createElement('div');
    note.textContent = message;
    note.style.cssText = [
      'position: fixed', 'top: 80px', 'right: 20px', 'padding: 0.8rem 1.2rem',
      'border-radius: 8px', 'color: #04101f', 'z-index: 1001',
      `background: ${kind === 'success' ? '#4ade80' : '#fb7185'}`,
    ].join(';');
    document.body.appendChild(note);
    setTimeout(() => note.remove(), 4000);
  }

  function initDetection() {
    const startBtn = $('startCamera');
    const stopBtn = $('stopCamera');
    const feed = $('webcamFeed');
    const placeholder = $('webcamPlaceholder');
    const faceCount = $('faceCount');
    const facesList = $('facesList');
    const resultsPanel = $('resultsPanel');
    let pollTimer = null;

    function setRunning(running) {
      startBtn.disabled = running;
      stopBtn.disabled = !running;
      $('statusDot').classList.toggle('active', running);
      $('statusText').textContent = running ? 'Camera Active' : 'Camera Offline';
      $('cameraStatus').textContent = running ? 'Online' : 'Offline';
      $('detectionStatus').textContent = running ? 'Monitoring' : 'Inactive';
      feed.style.display = running ? 'block' : 'none';
      placeholder.style.display = running ? 'none' : 'flex';
      resultsPanel.style.display = running ? 'block' : 'none';
      if (running) {
        feed.src = `/video_feed?t=${Date.now()}`;
      } else {
        feed.removeAttribute('src');
        faceCount.textContent = '0';
        renderFaces(0);
      }
    }

    function renderFaces(count) {
      facesList.innerHTML = '';
      if (count === 0) {
        facesList.innerHTML = '<div class="face-item"><span>No faces detected</span></div>';
        return;
      }
      for (let i = 1; i <= count; i += 1) {
        const item = document.createElement('div');
        item.className = 'face-item';
        item.innerHTML = `<strong>Face #${i}</strong><span style="color: #4ade80">&#9679; Live</span>`;
        facesList.appendChild(item);
      }
    }

    function startPolling() {
      stopPolling();
      pollTimer = setInterval(async () => {
        try {
          const data = await (await fetch('/get_face_count')).json();
          if (!data.success) return;
          faceCount.textContent = data.face_count;
          renderFaces(data.face_count);
          $('detectionStatus').textContent = data.face_count > 0
            ? `${data.face_count} Face${data.face_count > 1 ? 's' : ''} Detected`
            : 'Monitoring';
        } catch (err) {
          console.error('face count poll failed', err);
        }
      }, 1000);
    }

    function stopPolling() {
      if (pollTimer) {
        clearInterval(pollTimer);
        pollTimer = null;
      }
    }

    startBtn.addEventListener('click', async () => {
      $('loadingModal').style.display = 'flex';
      try {
        const data = await (await fetch('/start_camera', { method: 'POST' })).json();
        if (data.success) {
          setRunning(true);
          startPolling();
          notify(data.message, 'success');
        } else {
          $('errorMessage').textContent = `Failed to start camera: ${data.message}`;
          $('errorModal').style.display = 'flex';
        }
      } catch (err) {
        notify(`Error starting camera: ${err.message}`, 'error');
      } finally {
        $('loadingModal').style.display = 'none';
      }
    });

    stopBtn.addEventListener('click', async () => {
      try {
        const data = await (await fetch('/stop_camera', { method: 'POST' })).json();
        stopPolling();
        setRunning(false);
        notify(data.message, 'success');
      } catch (err) {
        notify(`Error stopping camera: ${err.message}`, 'error');
      }
    });

    $('errorClose').addEventListener('click', () => {
      $('errorModal').style.display = 'none';
    });

    fetch('/api/camera_status')
      .then((resp) => resp.json())
      .then((status) => {
        if (status.camera_active) {
          setRunning(true);
          startPolling();
        }
      })
      .catch((err) => console.log('camera status check failed', err));
  }

  function initContactForm() {
    const form = $('contactForm');
    form.addEventListener('submit', (event) => {
      event.preventDefault();
      const fields = ['name', 'email', 'subject', 'message'].map((id) => $(id).value.trim());
      if (fields.some((value) => !value)) {
        notify('Please fill in all fields.', 'error');
        return;
      }
      form.reset();
      notify('Thank you for your message!', 'success');
    });
  }

  document.addEventListener('DOMContentLoaded', () => {
    const toggle = document.querySelector('.nav-toggle');
    const menu = document.querySelector('.nav-menu');
    if (toggle && menu) {
      toggle.addEventListener('click', () => {
        menu.style.display = menu.style.display === 'flex' ? 'none' : 'flex';
      });
    }
    if (document.querySelector('.webcam-container')) initDetection();
    if ($('contactForm')) initContactForm();
  });
})();
"#;
