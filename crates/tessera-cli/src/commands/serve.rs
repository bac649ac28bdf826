use tessera_config::TesseraConfig;
use tracing::warn;

pub(super) async fn cmd_serve(
    mut config: TesseraConfig,
    listen: Option<String>,
) -> tessera_core::Result<()> {
    if let Some(listen) = listen {
        config.server.listen = listen;
    }

    match config.validate() {
        Ok(warnings) => {
            for w in warnings {
                warn!("{w}");
            }
        }
        Err(msg) => return Err(tessera_core::TesseraError::Config(msg)),
    }

    println!("🧩 Tessera listening on http://{}", config.server.listen);
    if config.server.api_key.is_none() {
        println!("   API key: none (set server.api_key to require Bearer auth)");
    }

    tessera_server::start_server(config.server, config.skills).await
}
