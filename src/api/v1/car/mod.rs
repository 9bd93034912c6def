mod featured;
mod get;
mod list;

use warp::Filter;

use crate::state::AppState;

pub fn api_v1_car(
    state: AppState,
) -> impl Filter<Extract = (impl warp::Reply,), Error = warp::Rejection> + Clone {
    warp::path("car")
        .and(
            list::main(state.clone())
                .or(featured::main(state.clone()))
                .or(get::main(state)),
        )
        .and(warp::path::end())
}
