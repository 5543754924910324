use rhsecq::application::Application;

use std::process::exit;

fn main() {
    ctrlc::set_handler(|| {
        println!("\nReceived interrupt. Exiting.");
        exit(0);
    })
    .expect("Unable to install the interrupt handler.");

    let mut application = Application::new();
    application.read_argv();
    if let Err(error) = application.run() {
        eprintln!("{}: {}", env!("CARGO_PKG_NAME"), error);
        exit(1);
    }
}
