mod api;
mod config;
mod helper_model;
mod integration;
mod methods;
mod model;
mod scheduled_tasks;
mod state;
#[cfg(test)]
mod test_support;

use warp::Filter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = config::Config::from_env()?;
    let addr = config.httpd_addr;
    let state = state::AppState::from_config(config).await?;

    tokio::spawn(scheduled_tasks::housekeeping_task(state.clone()));

    // routing for the server
    let httpd = api::api(state).with(warp::log("car_rental_httpd"));
    log::info!("listening on {}", addr);
    warp::serve(httpd).run(addr).await;
    Ok(())
}
