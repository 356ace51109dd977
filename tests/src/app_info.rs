// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Application info tests

use log::info;

use ledger_crab::{DeviceHandle, Exchange};

/// Expected application name
pub const APP_NAME: &str = "Crab";

/// Fetch application name and version
pub async fn test<T>(t: T) -> anyhow::Result<()>
where
    T: Exchange + Send,
{
    let d = DeviceHandle::from(t);

    let i = d.app_info().await?;

    info!("app info: {:?}", i);

    assert_eq!(i.app_name, APP_NAME);

    // Versions are `MAJOR.MINOR.PATCH`
    let parts: Vec<_> = i.app_version.split('.').collect();
    assert_eq!(parts.len(), 3);
    for p in parts {
        p.parse::<u8>()?;
    }

    Ok(())
}
