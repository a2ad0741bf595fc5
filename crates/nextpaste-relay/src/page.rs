//! Info page served at `/`.

const TEMPLATE: &str = r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="UTF-8">
    <title>NextPaste Relay</title>
    <style>
        body { font-family: Arial, sans-serif; max-width: 800px; margin: 50px auto; padding: 20px; }
        h1 { color: #333; }
        code { background: #f4f4f4; padding: 2px 6px; border-radius: 3px; }
        .info { background: #e7f3ff; padding: 15px; border-left: 4px solid #2196F3; margin: 20px 0; }
    </style>
</head>
<body>
    <h1>NextPaste Relay</h1>
    <p>The room-isolated WebSocket relay is running.</p>

    <div class="info">
        <h3>Connecting</h3>
        <p>WebSocket URL: <code>ws://{host}/ws/&lt;roomID&gt;</code></p>
        <p>Example: <code>ws://{host}/ws/my-room-123</code></p>
    </div>

    <div class="info">
        <h3>Behaviour</h3>
        <ul>
            <li>Any number of rooms</li>
            <li>Clients in the same room share their clipboards</li>
            <li>Rooms are fully isolated from each other</li>
            <li>Messages are forwarded unchanged, so both the binary V1.1 protocol and the JSON V1.0 protocol work</li>
        </ul>
    </div>

    <p><a href="/health">Health check</a> &middot; <a href="/stats">Stats</a></p>
</body>
</html>
"#;

/// Render the page for a request that arrived with `Host: host`.
pub fn render(host: &str) -> String {
    TEMPLATE.replace("{host}", &escape(host))
}

fn escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
