use std::sync::Arc;
use std::time::Instant;

use tokio::sync::watch;

use rovax_core::angle::normalize_angle;
use rovax_core::metric::MetricValue;
use rovax_core::position::Pose;
use rovax_core::route::RoutePlan;
use rovax_core::{Identity, Trace, Tracer};

use crate::config::DriveKind;
use crate::consts::TICK_INTERVAL;
use crate::device::{self, DeviceDescriptor, MetricDevice};
use crate::driver::{
    SimState, VirtualEncoder, VirtualHull, VirtualInertial, BACK_ADDR, FRONT_ADDR, LEFT_ADDR,
    RIGHT_ADDR,
};
use crate::kernel::carrier::{Actuator, Carrier};
use crate::robot::odometry::{Odometry, PoseEstimate, TrackerSample};
use crate::robot::{Drivetrain, Tracker, TrackerGroup};
use crate::runtime::operand::Operand;
use crate::runtime::{self, exec, Error, MotionPublisher, RuntimeContext};
use crate::Config;

/// Bring the virtual machine online.
///
/// Probes the motion and sensor devices, seeds the start pose and
/// spawns the pose fuser. Returns the motion publisher and the pose
/// estimate channel for the executor.
pub(crate) async fn spawn_machine<T: Tracer>(
    config: &Config,
    runtime: &RuntimeContext,
) -> runtime::Result<(
    MotionPublisher<VirtualHull, T::Instance>,
    watch::Receiver<PoseEstimate>,
)>
where
    T::Instance: 'static,
{
    if config.vehicle.drive == DriveKind::Holonomic {
        return Err(Error::UnsupportedDrivetrain);
    }

    let drivetrain = Drivetrain::from(&config.vehicle);

    let state = Arc::new(SimState::new(
        drivetrain.max_velocity(),
        drivetrain.track_width(),
    ));

    let motion_device = device::probe_device(VirtualHull::new(state.clone())).await?;

    let right_encoder = match &config.odometry.right {
        Some(tracker) => Some(
            device::probe_device(VirtualEncoder::new(
                state.clone(),
                Some(Actuator::RightDrive.into()),
                RIGHT_ADDR,
                Tracker::from(*tracker).raw_from_distance(1.0),
                config.odometry.jitter,
            ))
            .await?,
        ),
        None => None,
    };
    let left_encoder = match &config.odometry.left {
        Some(tracker) => Some(
            device::probe_device(VirtualEncoder::new(
                state.clone(),
                Some(Actuator::LeftDrive.into()),
                LEFT_ADDR,
                Tracker::from(*tracker).raw_from_distance(1.0),
                config.odometry.jitter,
            ))
            .await?,
        ),
        None => None,
    };
    let front_encoder = match &config.odometry.front {
        Some(tracker) => Some(
            device::probe_device(VirtualEncoder::new(
                state.clone(),
                None,
                FRONT_ADDR,
                Tracker::from(*tracker).raw_from_distance(1.0),
                config.odometry.jitter,
            ))
            .await?,
        ),
        None => None,
    };
    let back_encoder = match &config.odometry.back {
        Some(tracker) => Some(
            device::probe_device(VirtualEncoder::new(
                state.clone(),
                None,
                BACK_ADDR,
                Tracker::from(*tracker).raw_from_distance(1.0),
                config.odometry.jitter,
            ))
            .await?,
        ),
        None => None,
    };

    let inertial = if config.odometry.inertial {
        Some(
            device::probe_device(VirtualInertial::new(
                state,
                Actuator::RightDrive.into(),
                Actuator::LeftDrive.into(),
            ))
            .await?,
        )
    } else {
        None
    };

    let mut odometry = Odometry::new(TrackerGroup::from(&config.odometry));

    let [x, y, heading] = config.mission.start;
    let start = Pose::new(x, y, heading);

    odometry.set_position(start);
    if let Some(imu) = &inertial {
        // Align the sensor frame with the start heading so the first
        // fused pose observes no jump.
        imu.lock()
            .await
            .set_heading(normalize_angle(-start.heading()));
    }

    info!("Start position: {}", start);

    if config.enable_trace {
        std::fs::create_dir_all(&config.trace_dir).map_err(Error::Io)?;
    }

    let tracer = T::from_path(&config.trace_dir);

    let motion_publisher = MotionPublisher::new(
        motion_device,
        tracer.instance("motion"),
        config.enable_motion,
    );

    let (sender, estimate) = watch::channel(odometry.estimate());

    runtime.spawn_background_task(odometry_service(
        odometry,
        right_encoder,
        left_encoder,
        front_encoder,
        back_encoder,
        inertial,
        sender,
        tracer.instance("odometry"),
    ));

    Ok((motion_publisher, estimate))
}

/// Pose fuser service.
///
/// Polls the sensor devices on a fixed interval, advances the odometry
/// and publishes the pose estimate.
async fn odometry_service<W: rovax_core::TraceWriter>(
    mut odometry: Odometry,
    right: Option<DeviceDescriptor<VirtualEncoder>>,
    left: Option<DeviceDescriptor<VirtualEncoder>>,
    front: Option<DeviceDescriptor<VirtualEncoder>>,
    back: Option<DeviceDescriptor<VirtualEncoder>>,
    inertial: Option<DeviceDescriptor<VirtualInertial>>,
    sender: watch::Sender<PoseEstimate>,
    mut trace: W,
) {
    let start = Instant::now();
    let mut interval = tokio::time::interval(TICK_INTERVAL);

    loop {
        interval.tick().await;

        let mut sample = TrackerSample::default();

        if let Some(device) = &right {
            if let Some((address, value)) = device.lock().await.next().await {
                trace!("Signal 0x{:X} » {}", address, value);

                if let MetricValue::Count(count) = value {
                    sample.right = Some(count as f64);
                }
            }
        }
        if let Some(device) = &left {
            if let Some((address, value)) = device.lock().await.next().await {
                trace!("Signal 0x{:X} » {}", address, value);

                if let MetricValue::Count(count) = value {
                    sample.left = Some(count as f64);
                }
            }
        }
        if let Some(device) = &front {
            if let Some((address, value)) = device.lock().await.next().await {
                trace!("Signal 0x{:X} » {}", address, value);

                if let MetricValue::Count(count) = value {
                    sample.front = Some(count as f64);
                }
            }
        }
        if let Some(device) = &back {
            if let Some((address, value)) = device.lock().await.next().await {
                trace!("Signal 0x{:X} » {}", address, value);

                if let MetricValue::Count(count) = value {
                    sample.back = Some(count as f64);
                }
            }
        }
        if let Some(device) = &inertial {
            if let Some((address, value)) = device.lock().await.next().await {
                trace!("Signal 0x{:X} » {}", address, value);

                if let MetricValue::Heading(heading) = value {
                    sample.heading = Some(heading);
                }
            }
        }

        let estimate = odometry.advance(sample);

        estimate.record(&mut trace, start.elapsed());

        if sender.send(estimate).is_err() {
            break;
        }
    }
}

/// Launch the daemon.
///
/// Brings the machine online, reads the mission plan and executes it.
pub(crate) async fn launch<T: Tracer>(config: &Config) -> runtime::Result
where
    T::Instance: 'static,
{
    info!("{}", Carrier::intro());

    let runtime = RuntimeContext::new();

    let sender = runtime.shutdown.0.clone();
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();

        info!("Termination requested");

        sender.send(()).ok();
    });

    let (mut motion_publisher, estimate) = spawn_machine::<T>(config, &runtime).await?;

    let plan = match &config.mission.route {
        Some(name) => {
            let path = config.route_dir.join(format!("{}.txt", name));

            match std::fs::read_to_string(&path) {
                Ok(contents) => RoutePlan::decode(&contents),
                Err(_) => {
                    warn!(
                        "Route plan ({}) not found in {}",
                        name,
                        config.route_dir.to_string_lossy()
                    );

                    RoutePlan::default()
                }
            }
        }
        None => RoutePlan::default(),
    };

    debug!(
        "Mission plan holds {} action(s) over {} route(s)",
        plan.actions.len(),
        plan.routes.len()
    );

    if config.enable_test {
        info!("Configuration test successful");

        return Ok(());
    }

    if plan.actions.is_empty() {
        info!("No mission to execute");

        return Ok(());
    }

    let operand = Carrier::from_config(config);

    exec::exec_plan(&runtime, &operand, &plan, &mut motion_publisher, estimate).await
}
