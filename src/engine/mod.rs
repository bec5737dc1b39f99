// Engine modules: fixed-rate loop driver and physics

pub mod game_loop;
pub mod physics;
