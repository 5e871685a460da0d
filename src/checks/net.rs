use crate::core::Result;
use crate::shell::ShellClient;

pub const HWADDR_MARKER: &str = "HWaddr";

/// MAC address of the first interface `busybox ifconfig` reports, lowercased.
pub async fn hardware_address(client: &ShellClient) -> Result<Option<String>> {
    let line = client
        .first_line_containing("busybox", &["ifconfig"], HWADDR_MARKER)
        .await?;
    Ok(line.as_deref().and_then(parse_hardware_address))
}

pub fn parse_hardware_address(line: &str) -> Option<String> {
    let (_, rest) = line.split_once(HWADDR_MARKER)?;
    rest.split_whitespace().next().map(|addr| addr.to_lowercase())
}
