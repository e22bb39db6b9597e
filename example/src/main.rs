use arm_kinematics::{Arm, ArmConfig, BranchSelector, CartesianTarget, KinematicSolution, Target, Transform};
use tracing::{error, info};

fn print_solution(label: &str, solution: &KinematicSolution) {
    let degrees: Vec<String> = solution.joints.iter().map(|j| format!("{:8.2}", j.to_degrees())).collect();
    let tcp = solution.tool_frame().to_xyzwpr();

    println!(
        "{:<12} J=[{}]  TCP=({:.1}, {:.1}, {:.1})",
        label,
        degrees.join(","),
        tcp[0],
        tcp[1],
        tcp[2]
    );
    for diagnostic in &solution.diagnostics {
        println!("{:<12}   ! {}", "", diagnostic);
    }
}

fn main() {
    tracing_subscriber::fmt::init();

    // ARM_PRESET picks the arm: "irb120" (default) or "ur5e"
    let preset = std::env::var("ARM_PRESET").unwrap_or_else(|_| "irb120".to_string());
    let config = match preset.as_str() {
        "ur5e" => ArmConfig::ur5e(),
        _ => ArmConfig::irb120(),
    };

    let arm = match Arm::from_config(config) {
        Ok(arm) => {
            info!("Loaded {} ({:?})", arm.config().name, arm.config().topology);
            arm
        }
        Err(e) => {
            error!("Invalid arm configuration: {}", e);
            return;
        }
    };

    let tool = Transform::from_translation(0.0, 0.0, 100.0);
    let joints = [0.3, -0.4, 0.5, 0.7, -0.9, 1.1];

    let reference = arm.solve(&Target::Joint(joints), Some(&tool));
    print_solution("forward", &reference);

    // Same TCP pose under every branch selector
    let pose = *reference.tool_frame();
    let targets: Vec<Target> = BranchSelector::all()
        .map(|selector| CartesianTarget::new(pose, selector).into())
        .collect();
    for (selector, solution) in BranchSelector::all().zip(arm.solve_all(&targets, Some(&tool))) {
        print_solution(&format!("selector {}", selector.0), &solution);
    }

    // Out of reach: fallback angles plus diagnostics
    let far = CartesianTarget::new(Transform::from_translation(3000.0, 0.0, 500.0), BranchSelector(0));
    let solution = arm.solve(&far.into(), Some(&tool));
    print_solution("unreachable", &solution);

    match serde_json::to_string_pretty(&solution) {
        Ok(json) => println!("{}", json),
        Err(e) => error!("Failed to serialize solution: {}", e),
    }
}
