use crate::generator::profile::{build_capture_payload_from_config, GeneratorConfig};
use crate::gui_bridge::model::VisualizationModel;
use crate::workflow::runner::Runner;
use anyhow::Result;
use formcore::pose_interface::CapturePayload;
use serde_json::json;
use std::{
    net::SocketAddr,
    sync::{Arc, RwLock},
    thread,
};
use tokio::runtime::Builder;
use warp::{http::StatusCode, Filter};

fn gui_bind_address() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 9010))
}

#[derive(Debug)]
struct WarpError;

impl warp::reject::Reject for WarpError {}

/// Bridge that hosts the report HTTP endpoint and analyzes incoming
/// capture payloads.
pub struct GuiBridge {
    state: Arc<RwLock<VisualizationModel>>,
}

impl GuiBridge {
    pub fn new(runner: Arc<Runner>) -> Self {
        let state = Arc::new(RwLock::new(VisualizationModel::default()));
        let state_for_filter = state.clone();
        let state_filter = warp::any().map(move || state_for_filter.clone());
        let runner_filter = warp::any().map(move || runner.clone());

        let get_route = warp::path("report")
            .and(warp::get())
            .and(state_filter.clone())
            .map(|state: Arc<RwLock<VisualizationModel>>| {
                warp::reply::json(&*state.read().unwrap())
            });

        let post_route = warp::path("analyze")
            .and(warp::post())
            .and(warp::body::json())
            .and(state_filter.clone())
            .and(runner_filter.clone())
            .and_then(
                |payload: CapturePayload,
                 state: Arc<RwLock<VisualizationModel>>,
                 runner: Arc<Runner>| async move {
                    let result = runner.execute(&payload);
                    let reply = json!({
                        "status": "ok",
                        "exercise": result.analysis.exercise_name.to_string(),
                        "repCount": result.analysis.rep_count,
                    });
                    let mut guard = state.write().unwrap();
                    *guard = VisualizationModel::from_workflow(&result);
                    Ok::<_, warp::Rejection>(warp::reply::with_status(
                        warp::reply::json(&reply),
                        StatusCode::OK,
                    ))
                },
            );

        let generator_route = warp::path("analyze-config")
            .and(warp::post())
            .and(warp::body::json())
            .and(state_filter)
            .and(runner_filter)
            .and_then(
                |config: GeneratorConfig,
                 state: Arc<RwLock<VisualizationModel>>,
                 runner: Arc<Runner>| async move {
                    match build_capture_payload_from_config(&config) {
                        Ok(payload) => {
                            let result = runner.execute(&payload);
                            if let Some(name) = config.scenario.as_ref() {
                                println!(
                                    "[GUI] Scenario {} -> {} reps {}",
                                    name, result.analysis.exercise_name, result.analysis.rep_count
                                );
                            }
                            let reply = json!({
                                "status": "ok",
                                "exercise": result.analysis.exercise_name.to_string(),
                                "repCount": result.analysis.rep_count,
                                "description": config.description.clone().unwrap_or_default(),
                            });
                            let mut guard = state.write().unwrap();
                            *guard = VisualizationModel::from_workflow(&result);
                            Ok::<_, warp::Rejection>(warp::reply::with_status(
                                warp::reply::json(&reply),
                                StatusCode::OK,
                            ))
                        }
                        Err(err) => {
                            eprintln!("analyze-config error: {}", err);
                            Err(warp::reject::custom(WarpError))
                        }
                    }
                },
            );

        thread::spawn(move || {
            let routes = get_route.or(post_route).or(generator_route);
            let runtime = Builder::new_current_thread()
                .enable_all()
                .build()
                .expect("failed to build runtime");
            runtime.block_on(async move {
                warp::serve(routes).run(gui_bind_address()).await;
            });
        });

        Self { state }
    }

    pub fn publish(&self, model: &VisualizationModel) -> Result<()> {
        let mut guard = self.state.write().unwrap();
        *guard = model.clone();
        println!(
            "[GUI] angle profile points: {}, valid frames: {}",
            guard.angle_profile.len(),
            guard.valid_frames
        );
        Ok(())
    }

    pub fn publish_status(&self, message: &str) {
        println!("[GUI] {}", message);
    }

    #[cfg(test)]
    pub fn snapshot(&self) -> VisualizationModel {
        self.state.read().unwrap().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::profile::build_capture_payload;
    use crate::workflow::config::WorkflowConfig;
    use crate::workflow::runner::Runner;
    use formcore::pose_interface::ExerciseType;
    use std::sync::Arc;

    #[test]
    fn gui_bridge_updates_state() {
        let cfg = WorkflowConfig::default();
        let runner = Arc::new(Runner::new(cfg));
        let gui = GuiBridge::new(runner.clone());
        let payload = build_capture_payload(ExerciseType::Squat, 120).unwrap();
        let result = runner.execute(&payload);
        let model = VisualizationModel::from_workflow(&result);
        gui.publish(&model).unwrap();
        assert_eq!(gui.snapshot().valid_frames, result.valid_frames);
        assert!(gui.snapshot().analysis.is_some());
    }
}
