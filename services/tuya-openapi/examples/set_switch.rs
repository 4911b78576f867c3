//! Example turning a Tuya device switch on and off.
//!
//! ```shell
//! TUYA_ENDPOINT=https://openapi.tuyaus.com \
//! TUYA_ACCESS_ID=xxx TUYA_ACCESS_SECRET=xxx TUYA_DEVICE_ID=xxx \
//! cargo run --example set_switch -- on
//! ```

use anyhow::Context as _;
use tuyasign_core::{Context, OsEnv};
use tuyasign_http_send_reqwest::ReqwestHttpSend;
use tuyasign_tuya_openapi::{Client, Command, Config};

const SWITCH_CODE: &str = "switch_1";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Debug)
        .init();

    let device_id = std::env::var("TUYA_DEVICE_ID").context("TUYA_DEVICE_ID must be set")?;
    let on = !matches!(std::env::args().nth(1).as_deref(), Some("off"));

    let ctx = Context::new()
        .with_http_send(ReqwestHttpSend::default())
        .with_env(OsEnv);
    let client = Client::new(ctx, Config::new());

    let token = client.get_token().await?;
    println!("Got token: {token:?}");

    let result = client
        .send_commands(
            &token.access_token,
            &device_id,
            &[Command::new(SWITCH_CODE, on)],
        )
        .await?;
    println!("Switch {device_id} set to {on}: {result}");

    Ok(())
}
