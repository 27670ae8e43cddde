//! Vendor client factory
//!
//! Builds the client for a [`VendorKind`] from its configuration section
//! and performs the vendor handshake before handing it out.

use super::edumate::EdumateClient;
use super::engage::EngageClient;
use super::mssql::MssqlClient;
use super::pcschool::PcSchoolClient;
use super::sentral::SentralClient;
use super::tass::{TassCalendarClient, TassLmsClient};
use super::vendor::SisVendor;
use crate::config::SatchelConfig;
use crate::domain::{Result, SatchelError, VendorKind};

fn section<'a, T>(section: &'a Option<T>, kind: VendorKind, name: &str) -> Result<&'a T> {
    section.as_ref().ok_or_else(|| {
        SatchelError::Configuration(format!(
            "{kind} requires a [{name}] section in the configuration"
        ))
    })
}

/// Create an authenticated client for `kind`
///
/// # Errors
///
/// Returns a configuration error when the vendor's section is missing, and
/// whatever the vendor's `authenticate` returns otherwise.
pub async fn create_vendor(kind: VendorKind, config: &SatchelConfig) -> Result<Box<dyn SisVendor>> {
    let http = &config.http;

    let mut vendor: Box<dyn SisVendor> = match kind {
        VendorKind::Edumate => Box::new(EdumateClient::new(
            section(&config.edumate, kind, "edumate")?.clone(),
            http,
        )?),
        VendorKind::Engage => Box::new(EngageClient::new(
            section(&config.engage, kind, "engage")?.clone(),
            http,
        )?),
        VendorKind::Mssql => Box::new(MssqlClient::new(
            section(&config.mssql, kind, "mssql")?.clone(),
            http,
        )),
        VendorKind::PcSchool => Box::new(PcSchoolClient::new(
            section(&config.pcschool, kind, "pcschool")?.clone(),
            http,
        )?),
        VendorKind::Sentral => Box::new(SentralClient::new(
            section(&config.sentral, kind, "sentral")?.clone(),
            http,
        )?),
        VendorKind::TassCalendar => Box::new(TassCalendarClient::new(
            section(&config.tass, kind, "tass")?.clone(),
            http,
        )?),
        VendorKind::TassLms => Box::new(TassLmsClient::new(
            section(&config.tass, kind, "tass")?.clone(),
            http,
        )?),
    };

    vendor.authenticate().await?;
    tracing::info!(vendor = %kind, base_url = %vendor.base_url(), "Vendor client ready");
    Ok(vendor)
}
