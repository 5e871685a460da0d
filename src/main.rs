mod ui;

use rootexec::checks::{net, RootChecker};
use rootexec::core::config::Config;
use rootexec::core::logging;
use rootexec::pm::PackageManager;
use rootexec::shell::ShellClient;
use std::path::PathBuf;
use ui::{ConsoleUi, Menu};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init("info");
    ConsoleUi::write_banner();
    let config = Config::load()?;
    let checker = RootChecker::from_config(&config);
    let packages = PackageManager::from_config(&config)?;
    let shell = ShellClient::from_config(&config);

    loop {
        Menu::render(checker.is_root_system());
        let Some(input) = ConsoleUi::read_line() else {
            return Ok(());
        };
        if input.eq_ignore_ascii_case("q") {
            return Ok(());
        }
        match Menu::parse_choice(&input) {
            Some(1) => println!("{}", checker.check()),
            Some(2) => {
                let path = ConsoleUi::prompt("Path of the APK to install:");
                if path.is_empty() {
                    continue;
                }
                ConsoleUi::info("Waiting for the package manager...");
                let code = packages.install_apk(&PathBuf::from(path)).await;
                ConsoleUi::render_result("install", code);
            }
            Some(3) => {
                let package = ConsoleUi::prompt("Package name to uninstall:");
                if package.is_empty() {
                    continue;
                }
                let code = packages.uninstall(&package).await;
                ConsoleUi::render_result("uninstall", code);
            }
            Some(4) => match net::hardware_address(&shell).await {
                Ok(Some(mac)) => ConsoleUi::success(&format!("Hardware address: {}", mac)),
                Ok(None) => ConsoleUi::warn("No interface reported a hardware address"),
                Err(e) => ConsoleUi::error(&format!("ifconfig failed: {}", e)),
            },
            _ => ConsoleUi::warn("Invalid choice, try again"),
        }
    }
}
