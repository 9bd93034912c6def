mod cancel;
mod list;
mod new;
mod quote;

use warp::Filter;

use crate::state::AppState;

pub fn api_v1_booking(
    state: AppState,
) -> impl Filter<Extract = (impl warp::Reply,), Error = warp::Rejection> + Clone {
    warp::path("booking")
        .and(
            quote::main(state.clone())
                .or(new::main(state.clone()))
                .or(list::main(state.clone()))
                .or(cancel::main(state)),
        )
        .and(warp::path::end())
}
