//! Probe command: is color management usable, and is the sRGB asset sane?

use crate::{ProbeArgs, SettingsArgs};
use anyhow::{bail, Result};
use csf_core::Capability;

pub fn run(args: ProbeArgs, settings: &SettingsArgs, verbose: u8) -> Result<()> {
    let config = super::load_config(settings)?;
    let capability = Capability::probe();

    let asset = if capability.is_available() {
        Some(config.load_asset())
    } else {
        None
    };
    let recognized = match &asset {
        Some(Ok(asset)) => Some(config.policy().recognizes(asset.description())),
        _ => None,
    };

    if args.json {
        let asset_json = match &asset {
            Some(Ok(a)) => serde_json::json!({ "description": a.description(), "size": a.bytes().len() }),
            Some(Err(e)) => serde_json::json!({ "error": e.to_string() }),
            None => serde_json::Value::Null,
        };
        let value = serde_json::json!({
            "available": capability.is_available(),
            "notice": capability.notice(),
            "asset": asset_json,
            "asset_recognized": recognized,
        });
        println!("{}", value);
    } else {
        match &capability {
            Capability::Available => println!("Color management: available"),
            Capability::Missing(reason) => {
                println!("Color management: unavailable ({})", reason);
                if let Some(notice) = capability.notice() {
                    println!("{}", notice);
                }
            }
        }
        match &asset {
            Some(Ok(a)) => {
                println!("sRGB profile:     {} ({})", a.description(), super::format_size(a.bytes().len() as u64));
                if verbose > 0 {
                    println!("Source:           {:?}", a.origin());
                }
                if recognized == Some(false) {
                    println!("Warning: the policy does not recognize this profile as sRGB");
                }
            }
            Some(Err(e)) => println!("sRGB profile:     failed to load ({})", e),
            None => {}
        }
    }

    capability.require()?;
    if let Some(Err(e)) = asset {
        bail!("sRGB profile unusable: {}", e);
    }
    Ok(())
}
