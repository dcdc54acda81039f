use log::info;
use std::fs;
use std::io;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use actix_web::{App, HttpServer, web};

use omega_gpio::{AppConfig, AppState, DeviceManager, GpioBackend, PinRegistry};

#[cfg(not(feature = "sysfs-gpio"))]
use omega_gpio::MockGpioBackend;
#[cfg(feature = "sysfs-gpio")]
use omega_gpio::SysfsBackend;

#[actix_web::main]
async fn main() -> io::Result<()> {
    env_logger::init();

    let config_path = std::env::args()
        .nth(1)
        .or_else(|| std::env::var("OMEGA_GPIO_CONFIG").ok())
        .unwrap_or_else(|| "config.json".to_string());
    let config = Arc::new(
        AppConfig::load_from_file(&config_path)
            .unwrap_or_else(|e| panic!("Failed to load config: {e}")),
    );

    let backend: Arc<dyn GpioBackend> = {
        #[cfg(feature = "sysfs-gpio")]
        {
            Arc::new(SysfsBackend::new(&config.sysfs))
        }
        #[cfg(not(feature = "sysfs-gpio"))]
        {
            Arc::new(MockGpioBackend::default())
        }
    };

    let registry = Arc::new(PinRegistry::new(backend));
    let manager = Arc::new(
        DeviceManager::new(&config, registry)
            .unwrap_or_else(|e| panic!("Failed to set up devices: {e}")),
    );
    let app_state = AppState {
        manager: manager.clone(),
    };

    let http_cfg = config.http.clone();
    let server = HttpServer::new(move || {
        let scope_path = http_cfg.path.clone();
        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .service(app_state.api_scope(&scope_path))
    })
    .client_request_timeout(Duration::from_secs(config.http.timeout));

    let http_cfg = config.http.clone();
    let (server, bind_addrs) = manager.release_on_error(|| {
        match (&http_cfg.unix_socket, &http_cfg.host) {
            (Some(socket_path), Some(host)) => {
                if Path::new(socket_path).exists() {
                    fs::remove_file(socket_path)?;
                }
                let server = server.bind_uds(socket_path)?.bind_auto_h2c(host)?;
                Ok((server, format!("{} and {}", socket_path, host)))
            }
            (Some(socket_path), None) => {
                if Path::new(socket_path).exists() {
                    fs::remove_file(socket_path)?;
                }
                Ok((server.bind_uds(socket_path)?, socket_path.clone()))
            }
            (None, Some(host)) => Ok((server.bind_auto_h2c(host)?, host.clone())),
            _ => Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "Config error: either 'unix_socket' or 'host' must be specified",
            )),
        }
    })?;

    info!("Starting server on {}...", bind_addrs);

    let result = server.run().await;

    info!("Releasing GPIO pins");
    manager.shutdown();

    result
}
