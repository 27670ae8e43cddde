//! Collections command implementation

use crate::domain::VendorKind;
use clap::Args;

/// Arguments for the collections command
#[derive(Args, Debug)]
pub struct CollectionsArgs {
    /// Vendor to list; every vendor when omitted
    #[arg(short, long)]
    pub vendor: Option<VendorKind>,
}

impl CollectionsArgs {
    /// Execute the collections command
    pub async fn execute(&self) -> anyhow::Result<i32> {
        for line in self.lines() {
            println!("{line}");
        }
        Ok(0)
    }

    fn lines(&self) -> Vec<String> {
        let vendors: Vec<VendorKind> = match self.vendor {
            Some(kind) => vec![kind],
            None => VendorKind::ALL.to_vec(),
        };
        vendors
            .into_iter()
            .map(|kind| format!("{kind}: {}", kind.collections().join(", ")))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_vendor() {
        let args = CollectionsArgs {
            vendor: Some(VendorKind::Engage),
        };
        assert_eq!(args.lines(), vec!["engage: pupils, contacts".to_string()]);
    }

    #[test]
    fn test_every_vendor_listed() {
        let args = CollectionsArgs { vendor: None };
        assert_eq!(args.lines().len(), VendorKind::ALL.len());
    }
}
