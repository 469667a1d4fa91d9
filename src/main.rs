use anyhow::Result;
use reqwest::Client;
use std::{env, sync::Arc, time::Duration};
use tokio::{signal, sync::RwLock, time::sleep};
use tracing::{info, warn, Level};

use jambimap::types::{AppCfg, DataState, GeoCfg};
use jambimap::{api, fetch, ingest};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter("info")
        .with_max_level(Level::INFO)
        .init();

    let cfg = app_cfg_from_env();
    let geo_cfg = GeoCfg::for_region(&cfg.region);

    let data = Arc::new(RwLock::new(DataState::default()));

    // optional local file, loaded once before the API comes up
    if !cfg.data_path.is_empty() {
        match ingest::load_file(&cfg.data_path, &geo_cfg) {
            Ok(st) => {
                info!(
                    "loaded {}: {} rows, {} geocoded",
                    cfg.data_path, st.kpis.rows, st.kpis.geocoded
                );
                *data.write().await = st;
            }
            Err(e) => warn!("loading {}: {e:?}", cfg.data_path),
        }
    }

    // HTTP client with compression
    let client = Client::builder().brotli(true).gzip(true).deflate(true).build()?;

    if !cfg.data_url.is_empty() {
        let data_c = data.clone();
        let client_c = client.clone();
        let cfg_c = cfg.clone();
        let geo_c = geo_cfg.clone();
        tokio::spawn(async move { refresh_loop(client_c, data_c, cfg_c, geo_c).await; });
    }

    let app = api::router(api::ApiState { data: data.clone(), geo: geo_cfg });
    info!("listening on http://{}", cfg.bind);
    let listener = tokio::net::TcpListener::bind(&cfg.bind).await?;
    let serve = axum::serve(listener, app);
    tokio::select! {
        r = serve => { r?; },
        _ = signal::ctrl_c() => { info!("shutdown signal received"); }
    }

    Ok(())
}

fn app_cfg_from_env() -> AppCfg {
    let mut c = AppCfg::default();
    if let Ok(v) = env::var("BIND") {
        c.bind = v;
    }
    if let Ok(v) = env::var("DATA_URL") {
        c.data_url = v;
    }
    if let Ok(v) = env::var("DATA_PATH") {
        c.data_path = v;
    }
    if let Ok(v) = env::var("T_REFRESH_S") {
        c.t_refresh_s = v.parse().unwrap_or(c.t_refresh_s);
    }
    if let Ok(v) = env::var("REGION") {
        c.region = v;
    }
    c
}

/// Poll the spreadsheet export, rebuild the snapshot when it changed.
async fn refresh_loop(
    client: Client,
    data: Arc<RwLock<DataState>>,
    cfg: AppCfg,
    geo_cfg: GeoCfg,
) {
    let mut cache = fetch::CacheCtl::default();
    loop {
        if let Err(e) = async {
            if let Some(bytes) = fetch::get_with_cache(&client, &cfg.data_url, &mut cache).await? {
                let txt = String::from_utf8_lossy(&bytes);
                let st = ingest::build_state(&txt, &geo_cfg)?;
                info!("snapshot refreshed: {} rows, {} geocoded", st.kpis.rows, st.kpis.geocoded);
                *data.write().await = st;
            }
            Ok::<_, anyhow::Error>(())
        }
        .await
        {
            warn!("refresh: {e:?}");
        }
        sleep(Duration::from_secs(cfg.t_refresh_s)).await;
    }
}
