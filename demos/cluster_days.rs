use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    trajectory_families::apps::run_cluster_days(std::env::args().skip(1))
}
