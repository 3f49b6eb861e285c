use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use tokio::sync::watch;

use rovax_core::motion::Motion;
use rovax_core::route::{RouteAction, RoutePlan};
use rovax_core::TraceWriter;

use crate::consts::{ACTION_SETTLE, TICK_INTERVAL};
use crate::device::MotionDevice;
use crate::robot::odometry::PoseEstimate;
use crate::runtime::{self, program, MotionPublisher, RuntimeContext};

use super::operand::Operand;

/// Execute a mission plan.
///
/// Actions run in order, one at a time. Every action is mapped onto a
/// motion program by the operand and the program is run to completion
/// before the next action starts. The machine settles between actions.
///
/// On shutdown all motion is stopped and the remaining actions are
/// abandoned.
pub async fn exec_plan<K, D, W>(
    runtime: &RuntimeContext,
    operand: &K,
    plan: &RoutePlan,
    motion_publisher: &mut MotionPublisher<D, W>,
    estimate: watch::Receiver<PoseEstimate>,
) -> runtime::Result
where
    K: Operand<MotionPlan = Motion>,
    D: MotionDevice,
    W: TraceWriter,
{
    let mut shutdown = runtime.shutdown_signal();

    let in_motion = AtomicBool::new(false);

    info!("Execute mission plan with {} action(s)", plan.actions.len());

    for action in &plan.actions {
        if shutdown.try_recv().is_ok() {
            motion_publisher.publish(Motion::StopAll).await;

            warn!("Mission terminated by external signal");

            return Ok(());
        }

        if let RouteAction::Follow { route_name, .. } = action {
            if !plan.routes.contains_key(route_name) {
                warn!("Route ({}) is not part of the plan, skipping", route_name);
                continue;
            }
        }

        let mut program = match operand.fetch_program(plan, action) {
            Ok(program) => program,
            Err(_) => {
                warn!("Program ({}) was not registered with the operand", action);
                continue;
            }
        };

        if in_motion.swap(true, Ordering::SeqCst) {
            warn!("Motion already in progress, skipping program ({})", action);
            continue;
        }

        info!("Start program ({})", action);

        let mut ctx = program::Context::new(estimate.clone());
        if let Some(motion) = program.boot(&mut ctx) {
            motion_publisher.publish(motion).await;
        };

        // Loop until this program reaches its termination condition. If
        // the program does not terminate we'll run until the application
        // is killed.
        while !program.can_terminate(&mut ctx) {
            let start_step_execute = Instant::now();

            tokio::select! {
                plan_motion = program.step(&mut ctx) => {
                    if let Some(motion) = plan_motion {
                        motion_publisher.publish(motion).await;
                    }
                }
                _ = shutdown.recv() => {
                    // Stop all motion for safety.
                    motion_publisher.publish(Motion::StopAll).await;

                    warn!("Program ({}) terminated by external signal", action);

                    return Ok(());
                }
            };

            ctx.step_count += 1;
            ctx.last_step = start_step_execute;

            tokio::time::sleep(TICK_INTERVAL).await;
        }

        // Execute an optional last action before program termination.
        if let Some(motion) = program.term_action(&mut ctx) {
            motion_publisher.publish(motion).await;
        }

        in_motion.store(false, Ordering::SeqCst);

        info!("Program ({}) terminated with success", action);

        // Let the vehicle come to rest before the next action.
        tokio::time::sleep(ACTION_SETTLE).await;
    }

    // Stop all motion for safety.
    motion_publisher.publish(Motion::StopAll).await;

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use rovax_core::algorithm::Pid;
    use rovax_core::angle::shortest_angle;
    use rovax_core::position::Pose;

    use super::*;
    use crate::kernel::carrier::Carrier;
    use crate::runtime::builder::spawn_machine;
    use crate::runtime::operand::Operand;
    use crate::runtime::NullTracer;
    use crate::Config;

    #[tokio::test]
    async fn test_follow_route_to_point() {
        let config = Config::default();
        let runtime = RuntimeContext::new();

        let (mut publisher, estimate) = spawn_machine::<NullTracer>(&config, &runtime)
            .await
            .unwrap();
        let operand = Carrier::from_config(&config);

        let plan = RoutePlan::decode("rs 2 3000 8 p 0 0 p 24 0 re eof");

        exec_plan(&runtime, &operand, &plan, &mut publisher, estimate.clone())
            .await
            .unwrap();

        let pose = estimate.borrow().current;
        assert!(pose.x > 2.0, "the vehicle never moved: {}", pose);
        assert!(
            pose.distance(&Pose::new(24.0, 0.0, 0.0)) < 2.5,
            "stopped outside tolerance: {}",
            pose
        );
    }

    #[tokio::test]
    async fn test_straight_drive() {
        let config = Config::default();
        let runtime = RuntimeContext::new();

        let (mut publisher, estimate) = spawn_machine::<NullTracer>(&config, &runtime)
            .await
            .unwrap();
        let operand = Carrier::from_config(&config);

        let plan = RoutePlan::decode("ps 24 2 3000 eof");

        exec_plan(&runtime, &operand, &plan, &mut publisher, estimate.clone())
            .await
            .unwrap();

        let pose = estimate.borrow().current;
        assert!(
            pose.distance(&Pose::new(24.0, 0.0, 0.0)) < 2.5,
            "stopped outside tolerance: {}",
            pose
        );
    }

    #[tokio::test]
    async fn test_turn_onto_heading() {
        let mut config = Config::default();
        config.turn_pid = Pid::with_bounds(200.0, 0.0, 0.0, 10.0, 127.0);
        let runtime = RuntimeContext::new();

        let (mut publisher, estimate) = spawn_machine::<NullTracer>(&config, &runtime)
            .await
            .unwrap();
        let operand = Carrier::from_config(&config);

        let plan = RoutePlan::decode("ts 1.5707 0.05 3000 eof");

        exec_plan(&runtime, &operand, &plan, &mut publisher, estimate.clone())
            .await
            .unwrap();

        let pose = estimate.borrow().current;
        assert!(
            shortest_angle(pose.heading(), 1.5707).abs() < 0.2,
            "stopped far from the target heading: {}",
            pose
        );
    }

    #[tokio::test]
    async fn test_machine_command() {
        let config = Config::default();
        let runtime = RuntimeContext::new();

        let (mut publisher, estimate) = spawn_machine::<NullTracer>(&config, &runtime)
            .await
            .unwrap();
        let operand = Carrier::from_config(&config);

        let plan = RoutePlan::decode("cs bed_lift eof");

        exec_plan(&runtime, &operand, &plan, &mut publisher, estimate)
            .await
            .unwrap();

        assert!(operand.bed().is_raised());
    }

    #[tokio::test]
    async fn test_unknown_command_skipped() {
        let config = Config::default();
        let runtime = RuntimeContext::new();

        let (mut publisher, estimate) = spawn_machine::<NullTracer>(&config, &runtime)
            .await
            .unwrap();
        let operand = Carrier::from_config(&config);

        let plan = RoutePlan::decode("cs warp_drive eof");

        exec_plan(&runtime, &operand, &plan, &mut publisher, estimate)
            .await
            .unwrap();

        assert!(!operand.bed().is_raised());
    }

    #[tokio::test]
    async fn test_unknown_route_skipped() {
        let config = Config::default();
        let runtime = RuntimeContext::new();

        let (mut publisher, estimate) = spawn_machine::<NullTracer>(&config, &runtime)
            .await
            .unwrap();
        let operand = Carrier::from_config(&config);

        let plan = RoutePlan::new(
            HashMap::new(),
            vec![RouteAction::Follow {
                route_name: "7".to_owned(),
                end_tolerance: 2.0,
                timeout: 1000,
                lookahead: 8.0,
            }],
        );

        exec_plan(&runtime, &operand, &plan, &mut publisher, estimate.clone())
            .await
            .unwrap();

        let pose = estimate.borrow().current;
        assert!(pose.distance(&Pose::default()) < 0.5, "the vehicle moved");
    }
}
