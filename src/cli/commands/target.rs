//! Target command handler

use wiz_scholar::config::Config;
use wiz_scholar::core::storage::FileStorage;

/// Print the SGPA needed in each future semester to reach `target`
pub fn run(target: f64, future_semesters: u32, config: &Config) {
    let storage = FileStorage::in_dir(&config.data_dir());
    let store = super::semester::load_store(&storage);

    let projection = store
        .required_future_sgpa(target, future_semesters)
        .unwrap_or_else(|e| super::fail(e));

    println!(
        "Required SGPA: {:.2} in each of the next {future_semesters} semester(s)",
        projection.required_sgpa
    );
    println!(
        "Based on {} completed credits and {} projected credits",
        projection.current_credits, projection.projected_future_credits
    );
    if projection.achievable {
        println!("✓ Target CGPA {target:.2} is achievable");
    } else {
        println!("✗ Target CGPA {target:.2} is out of reach on a ten-point scale");
    }
}
