use crate::methods::booking;
use crate::state::AppState;

/// Drops expired sessions and stale booking replays. Runs until the process exits.
pub async fn housekeeping_task(state: AppState) {
    let mut interval = tokio::time::interval(state.config.session_purge_interval);
    // the first tick completes immediately
    interval.tick().await;
    loop {
        interval.tick().await;
        let sessions = state.sessions.purge_expired().await;
        let replays = booking::purge_replays(&state).await;
        if sessions > 0 || replays > 0 {
            log::info!("purged {} expired session(s) and {} booking replay(s)", sessions, replays);
        } else {
            log::debug!("nothing to purge");
        }
    }
}
