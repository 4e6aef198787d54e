//! `pdv fetch` – download a URL and print its SHA-256.

use anyhow::Result;
use pdv_core::checksum;
use pdv_core::fetch::{self, FetchOptions};

pub fn run_fetch(url: &str, insecure: bool) -> Result<()> {
    let opts = FetchOptions {
        verify_tls: !insecure,
    };
    let body = fetch::http_get(url, opts)?;
    println!("{}  {}", checksum::sha256_bytes(&body), url);
    Ok(())
}
