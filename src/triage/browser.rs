use anyhow::{Result, anyhow};

/// Opens links for the operator.
pub trait Browser {
    fn open(&mut self, url: &str) -> Result<()>;
}

/// The desktop's default browser.
pub struct SystemBrowser;

impl Browser for SystemBrowser {
    fn open(&mut self, url: &str) -> Result<()> {
        open::that(url).map_err(|e| anyhow!("could not open {url}: {e}"))
    }
}
