use std::thread;
use std::time::Duration;
use gosub_webview::native::backends::headless::HeadlessBackend;
use gosub_webview::{Webview, WebviewError};

fn main() -> Result<(), WebviewError> {
    env_logger::init();

    let mut webview = Webview::new(false, Box::new(HeadlessBackend::new()))?;
    webview.set_title("Background terminate")?;
    webview.set_html("<h1>Closing in two seconds</h1>")?;

    // Workers only get the proxy. Everything UI related is marshaled back to
    // the UI thread through dispatch().
    let proxy = webview.proxy();
    let worker = thread::spawn(move || {
        thread::sleep(Duration::from_secs(1));
        let _ = proxy.dispatch(|wv| {
            if let Err(e) = wv.set_title("Closing...") {
                eprintln!("cannot set title: {e}");
            }
        });

        thread::sleep(Duration::from_secs(1));
        println!("Worker requests termination");
        proxy.terminate();
    });

    webview.run()?;
    println!("Event loop returned, title was {:?}", webview.title());

    if worker.join().is_err() {
        eprintln!("worker thread panicked");
    }

    webview.destroy()
}
