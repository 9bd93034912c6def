mod create;
mod login;
mod logout;
mod retrieve;
mod update;

use warp::Filter;

use crate::state::AppState;

pub fn api_v1_user(
    state: AppState,
) -> impl Filter<Extract = (impl warp::Reply,), Error = warp::Rejection> + Clone {
    warp::path("user")
        .and(
            login::main(state.clone())
                .or(create::main(state.clone()))
                .or(logout::main(state.clone()))
                .or(retrieve::main(state.clone()))
                .or(update::main(state)),
        )
        .and(warp::path::end())
}
