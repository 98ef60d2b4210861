pub mod dashboard_service;
pub mod order_service;

#[cfg(test)]
mod testutil;
