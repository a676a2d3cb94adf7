// RRT trajectory tree growth in a walled box
//
// Grows the tree for a fixed number of iterations, commits to the first
// branch half way through (rerooting), and plots the XY projection.
// Run with RUST_LOG=debug to see index rebuilds and rerooting.

use std::sync::Arc;

use gnuplot::{AutoOption, AxesCommon, Caption, Color, Figure, PointSize, PointSymbol};
use itertools::Itertools;
use log::info;
use nalgebra::Vector3;
use serde_json::json;

use exploration_planner::mapping::VoxelMap;
use exploration_planner::path_planning::{GeneratorContext, GeneratorRegistry, ParamMap, RRT_NAME};
use exploration_planner::{BoundingVolume, PlannerResult, TrajectoryPoint, TrajectoryTree};

const ITERATIONS: usize = 600;
const SEED: u64 = 2024;

fn build_map(bounds: BoundingVolume) -> PlannerResult<VoxelMap> {
    let mut map = VoxelMap::new(bounds, 0.25)?;
    // two walls with a gap each
    map.add_box(&Vector3::new(4.0, -10.0, 0.0), &Vector3::new(4.5, 4.0, 3.0));
    map.add_box(&Vector3::new(-4.5, -4.0, 0.0), &Vector3::new(-4.0, 10.0, 3.0));
    Ok(map)
}

fn run() -> PlannerResult<()> {
    let bounds = BoundingVolume::from_array([-10.0, 10.0, -10.0, 10.0, 0.0, 3.0])?;
    let map = Arc::new(build_map(bounds)?);
    info!("map has {} occupied voxels", map.occupied_count());

    let params: ParamMap = json!({
        "velocity": 1.5,
        "sampling_rate": 5.0,
        "max_extension_range": 1.5,
        "use_spherical_sampling": false,
        "maximum_tries": 1000,
    })
    .as_object()
    .cloned()
    .unwrap_or_default();
    let context = GeneratorContext {
        bounds,
        oracle: map.clone(),
        seed: Some(SEED),
    };
    let registry = GeneratorRegistry::with_defaults();
    let mut generator = registry.create(RRT_NAME, &params, &context)?;

    let mut tree = TrajectoryTree::from_pose(TrajectoryPoint::at(Vector3::new(0.0, 0.0, 1.5)));
    let mut failures = 0;
    for i in 0..ITERATIONS {
        if i == ITERATIONS / 2 {
            if let Some(&first) = tree.children(tree.root()).first() {
                let removed = tree.reroot(first)?;
                info!("committed to {}, dropped {} segments", first, removed);
            }
        }
        let target = generator.select_segment(&tree);
        let mut new_segments = Vec::new();
        if !generator.expand_segment(&mut tree, target, &mut new_segments) {
            failures += 1;
        }
    }

    let leaves = tree.leaves(tree.root());
    let depth = leaves
        .iter()
        .map(|&leaf| std::iter::successors(Some(leaf), |&id| tree.parent(id)).count())
        .max()
        .unwrap_or(0);
    println!("Tree has {} segments, {} leaves, depth {}", tree.len(), leaves.len(), depth);
    println!("{} of {} iterations added nothing", failures, ITERATIONS);

    let mut fig = Figure::new();
    let obstacles = map.occupied_centers();
    let axes = fig
        .axes2d()
        .set_title("RRT trajectory tree", &[])
        .set_x_label("x [m]", &[])
        .set_y_label("y [m]", &[])
        .set_aspect_ratio(AutoOption::Fix(1.0))
        .points(
            obstacles.iter().map(|p| p.x),
            obstacles.iter().map(|p| p.y),
            &[Caption("Obstacles"), Color("black"), PointSymbol('.'), PointSize(0.5)],
        );
    for id in tree.all_nodes(tree.root()) {
        let trajectory = &tree[id].trajectory;
        for (a, b) in trajectory.iter().tuple_windows() {
            axes.lines(&[a.position.x, b.position.x], &[a.position.y, b.position.y], &[Color("gray")]);
        }
    }
    let root = tree[tree.root()].endpoint().unwrap_or_else(Vector3::zeros);
    axes.points(&[root.x], &[root.y], &[Caption("Root"), Color("blue"), PointSymbol('O'), PointSize(2.0)]);

    match fig.save_to_svg("./img/path_planning/rrt_exploration.svg", 640, 640) {
        Ok(_) => println!("Plot saved to ./img/path_planning/rrt_exploration.svg"),
        Err(e) => eprintln!("Failed to save SVG: {:?}", e),
    }
    Ok(())
}

fn main() {
    env_logger::init();
    println!("RRT exploration start!!");
    if let Err(e) = run() {
        eprintln!("{}", e);
        std::process::exit(1);
    }
    println!("Done!");
}
