use gosub_webview::native::backends::headless::HeadlessBackend;
use gosub_webview::{SizeHint, Webview, WebviewConfig, WebviewError, WebviewEvent};

fn main() -> Result<(), WebviewError> {
    env_logger::init();

    let config = WebviewConfig::builder()
        .title("Basic Example")
        .size(480, 320, SizeHint::None)
        .user_agent("Dalvik/2.1.0 (Linux; U; Android 6.0.1; Lenovo YT3-850M Build/MMB29M)")
        .build()
        .expect("Configuration is not valid");

    // A real application would pass a GTK, Cocoa or Win32 backend here
    let mut webview = Webview::create(config, Box::new(HeadlessBackend::new()))?;
    let mut event_rx = webview.subscribe_events();

    webview.init("window.greeting = 'hello from init'")?;
    webview.set_html("Thanks for using webview!")?;
    webview.navigate("https://www.whatismybrowser.com/detect/what-is-my-user-agent/")?;

    // Quit once the loop has handled everything queued so far. The headless
    // backend has no window the user could close.
    webview.proxy().dispatch(|wv| {
        if let Err(e) = wv.eval("console.log(window.greeting)") {
            eprintln!("eval failed: {e}");
        }
        wv.terminate();
    })?;

    webview.run()?;

    while let Ok(ev) = event_rx.try_recv() {
        match ev {
            WebviewEvent::LoadFinished { url, .. } => println!("[event] LoadFinished: {url:?}"),
            WebviewEvent::Terminated { reason, .. } => println!("[event] Terminated: {reason}"),
            other => println!("[event] {other:?}"),
        }
    }

    webview.destroy()?;
    println!("Done. Exiting.");
    Ok(())
}
