use std::fs;
use std::path::Path;
use std::process::Command;

fn main() {
    println!("🚀 Building form_relay WASM with demo HTML...");

    // 1. wasm-pack でビルド
    println!("📦 Running wasm-pack build...");
    let status = match Command::new("wasm-pack")
        .args([
            "build",
            "--target",
            "web",
            "--out-dir",
            "pkg",
            "--no-default-features",
            "--features",
            "wasm",
        ])
        .status()
    {
        Ok(status) => status,
        Err(e) => {
            eprintln!("❌ Failed to execute wasm-pack: {}", e);
            std::process::exit(1);
        }
    };

    if !status.success() {
        eprintln!("❌ wasm-pack build failed");
        std::process::exit(1);
    }

    println!("✅ WASM build completed");

    // 2. デモ用HTMLを生成
    println!("📝 Generating HTML file...");
    let pkg_dir = Path::new("pkg");
    if let Err(e) = fs::write(pkg_dir.join("index.html"), demo_html()) {
        eprintln!("❌ Failed to write index.html: {}", e);
        std::process::exit(1);
    }

    println!("✅ HTML file generated:");
    println!("   - pkg/index.html");
}

fn demo_html() -> &'static str {
    r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>form_relay</title>
    <script id="form-relay-config" type="application/json">
        {"form_selector": "form", "ask_new_button_id": "ask-new-btn", "log_level": "debug"}
    </script>
    <script>
        // ページ側で本来定義される関数の代わり
        function get_daily_paper(flag) {
            console.log("get_daily_paper", flag);
        }
    </script>
</head>
<body>
    <form action="/" method="post">
        <input type="text" name="url" placeholder="https://example.com">
        <input type="text" name="key" placeholder="custom key (optional)">
        <button type="submit">Generate</button>
    </form>
    <button id="ask-new-btn" type="button">Ask new</button>
    <script type="module">
        import init from './form_relay.js';
        init().catch(console.error);
    </script>
</body>
</html>
"#
}
