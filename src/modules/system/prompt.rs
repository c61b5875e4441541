use crate::proxy::config::ProxyMode;
use std::io::{BufRead, Write};
use tracing::{info, warn};

const MENU: &str = "1. Run with public proxy list\n2. Run with private proxy list\n3. Run without proxy\nChoose [1/2/3] -> ";

/// Asks until a valid choice is read. End of input falls back to direct mode.
pub fn read_proxy_mode<R: BufRead, W: Write>(mut input: R, mut output: W) -> ProxyMode {
    loop {
        let _ = write!(output, "{}", MENU);
        let _ = output.flush();

        let mut line = String::new();
        match input.read_line(&mut line) {
            Ok(0) => {
                warn!("No proxy mode selected (end of input), running without proxy");
                return ProxyMode::Direct;
            }
            Ok(_) => match ProxyMode::parse(&line) {
                Some(mode) => return mode,
                None => {
                    let _ = writeln!(output, "Please enter either 1, 2 or 3.");
                }
            },
            Err(e) => {
                warn!("Failed to read proxy mode ({}), running without proxy", e);
                return ProxyMode::Direct;
            }
        }
    }
}

/// `PROXY_MODE` wins over the interactive prompt.
pub fn choose_proxy_mode() -> ProxyMode {
    if let Ok(raw) = std::env::var("PROXY_MODE") {
        match ProxyMode::parse(&raw) {
            Some(mode) => {
                info!("Using proxy mode from environment: {}", mode.label());
                return mode;
            }
            None => warn!("Ignoring invalid PROXY_MODE value: {}", raw),
        }
    }

    let stdin = std::io::stdin();
    let mode = read_proxy_mode(stdin.lock(), std::io::stdout());
    info!("Proxy mode: {}", mode.label());
    mode
}
