mod control;
mod events;
mod metrics;
