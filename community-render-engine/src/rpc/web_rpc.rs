use crate::engine::scene::graph::SceneGraph;
use crate::engine::scene::naming::MonitorKind;
use crate::view::commands::{ViewCommand, ViewCommandEvent, ViewCommandSource};
use crate::view::labels::SceneLabels;
use crate::view::readings::{ReadingSource, daily_trend};
use crate::view::reconciler::building_layers;
use crate::view::store::{Layer, ViewMode, ViewStore};
use bevy::diagnostic::{DiagnosticsStore, FrameTimeDiagnosticsPlugin};
use bevy::prelude::*;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::JsValue;

#[cfg(target_arch = "wasm32")]
use web_sys::{MessageEvent, window};

/// JSON-RPC 2.0 request structure.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RpcRequest {
    pub jsonrpc: String,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
    pub id: Option<serde_json::Value>,
}

/// JSON-RPC 2.0 response structure.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RpcResponse {
    pub jsonrpc: String,
    pub result: Option<serde_json::Value>,
    pub error: Option<RpcError>,
    pub id: Option<serde_json::Value>,
}

/// JSON-RPC 2.0 notification structure for one-way communication.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RpcNotification {
    pub jsonrpc: String,
    pub method: String,
    pub params: serde_json::Value,
}

/// JSON-RPC error structure following specification.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct RpcError {
    pub code: i32,
    pub message: String,
    pub data: Option<serde_json::Value>,
}

/// Outgoing queue between the viewer and the dashboard page hosting it.
#[derive(Resource, Default)]
pub struct WebRpcInterface {
    outgoing_notifications: Vec<RpcNotification>,
    outgoing_responses: Vec<RpcResponse>,
}

impl WebRpcInterface {
    /// Send notification to the front-end without expecting response.
    pub fn send_notification(&mut self, method: &str, params: serde_json::Value) {
        self.outgoing_notifications.push(RpcNotification {
            jsonrpc: "2.0".to_string(),
            method: method.to_string(),
            params,
        });
    }

    /// Queue response for transmission to the front-end.
    fn queue_response(&mut self, response: RpcResponse) {
        self.outgoing_responses.push(response);
    }
}

/// Plugin establishing the postMessage bridge for iframe deployment.
pub struct WebRpcPlugin;

impl Plugin for WebRpcPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<WebRpcInterface>()
            .add_event::<IncomingRpcMessage>()
            .add_systems(
                Update,
                (
                    process_incoming_messages,
                    handle_rpc_messages,
                    send_outgoing_messages,
                )
                    .chain(),
            );

        #[cfg(target_arch = "wasm32")]
        app.add_systems(Startup, setup_message_listener);
    }
}

#[cfg(target_arch = "wasm32")]
fn setup_message_listener(mut commands: Commands) {
    use std::sync::Arc;
    use std::sync::Mutex;

    let message_queue: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
    let queue_clone = message_queue.clone();

    let closure = Closure::wrap(Box::new(move |event: MessageEvent| {
        if let Ok(data) = event.data().dyn_into::<js_sys::JsString>() {
            let message_str: String = data.into();

            if message_str.contains("jsonrpc") {
                if let Ok(mut queue) = queue_clone.lock() {
                    queue.push(message_str);
                }
            }
        }
    }) as Box<dyn FnMut(MessageEvent)>);

    let Some(window) = window() else {
        error!("Window object not available, RPC bridge disabled");
        return;
    };
    if let Err(e) =
        window.add_event_listener_with_callback("message", closure.as_ref().unchecked_ref())
    {
        error!("Failed to register message listener: {:?}", e);
        return;
    }

    // Ownership moves to JS; the listener lives for the page lifetime.
    closure.forget();
    commands.insert_resource(MessageQueue(message_queue));
}

/// Resource wrapping thread-safe message queue for WASM event handling.
#[derive(Resource)]
struct MessageQueue(std::sync::Arc<std::sync::Mutex<Vec<String>>>);

#[derive(Event)]
struct IncomingRpcMessage {
    content: String,
}

fn process_incoming_messages(
    message_queue: Option<Res<MessageQueue>>,
    mut message_events: EventWriter<IncomingRpcMessage>,
) {
    let Some(queue_res) = message_queue else {
        return;
    };

    let messages = if let Ok(mut queue) = queue_res.0.lock() {
        std::mem::take(&mut *queue)
    } else {
        Vec::new()
    };

    for message_str in messages {
        message_events.write(IncomingRpcMessage {
            content: message_str,
        });
    }
}

/// Read-only view state plus the random source a request may need.
pub struct RpcContext<'a> {
    pub store: &'a ViewStore,
    pub graph: &'a SceneGraph,
    pub labels: &'a SceneLabels,
    pub rng: &'a mut StdRng,
    pub fps: f32,
}

fn handle_rpc_messages(
    mut events: EventReader<IncomingRpcMessage>,
    diagnostics: Res<DiagnosticsStore>,
    mut rpc_interface: ResMut<WebRpcInterface>,
    store: Res<ViewStore>,
    graph: Res<SceneGraph>,
    labels: Res<SceneLabels>,
    mut readings: ResMut<ReadingSource>,
    mut view_commands: EventWriter<ViewCommandEvent>,
) {
    let fps = diagnostics
        .get(&FrameTimeDiagnosticsPlugin::FPS)
        .and_then(|fps_diagnostic| fps_diagnostic.smoothed())
        .unwrap_or(0.0) as f32;

    for event in events.read() {
        let request = match serde_json::from_str::<RpcRequest>(&event.content) {
            Ok(request) => request,
            Err(parse_error) => {
                warn!("Unparseable RPC message: {}", parse_error);
                rpc_interface.send_notification(
                    "debug_message",
                    serde_json::json!({
                        "message": format!("Parse error: {}", parse_error)
                    }),
                );
                continue;
            }
        };

        let mut queued = Vec::new();
        let mut context = RpcContext {
            store: &store,
            graph: &graph,
            labels: &labels,
            rng: &mut readings.0,
            fps,
        };
        if let Some(response) = handle_rpc_request(&request, &mut context, &mut queued) {
            rpc_interface.queue_response(response);
        }

        for command in queued {
            view_commands.write(ViewCommandEvent {
                command,
                source: ViewCommandSource::Rpc,
            });
        }
    }
}

/// Handle one request, queueing any view commands it implies.
///
/// Returns a response only for requests carrying an id.
pub fn handle_rpc_request(
    request: &RpcRequest,
    context: &mut RpcContext,
    view_commands: &mut Vec<ViewCommand>,
) -> Option<RpcResponse> {
    let result = match request.method.as_str() {
        "set_mode" => handle_set_mode(&request.params, view_commands),
        "select_building" => handle_select_building(&request.params, context, view_commands),
        "select_layer" => handle_select_layer(&request.params, view_commands),
        "clear_selection" => {
            view_commands.push(ViewCommand::ClearSelection);
            Ok(serde_json::json!({ "success": true }))
        }
        "close_monitor" => {
            view_commands.push(ViewCommand::CloseMonitor);
            Ok(serde_json::json!({ "success": true }))
        }
        "get_view_state" => handle_get_view_state(context),
        "get_building_layers" => handle_get_building_layers(&request.params, context),
        "get_monitor_trend" => handle_get_monitor_trend(&request.params, context),
        "get_fps" => Ok(serde_json::json!({ "fps": context.fps })),
        _ => {
            warn!("Unknown RPC method: {}", request.method);
            Err(RpcError {
                code: -32601,
                message: "Method not found".to_string(),
                data: Some(serde_json::json!({"method": request.method})),
            })
        }
    };

    // Notifications carry no id and get no response.
    let id = request.id.clone()?;
    Some(match result {
        Ok(result_value) => RpcResponse {
            jsonrpc: "2.0".to_string(),
            result: Some(result_value),
            error: None,
            id: Some(id),
        },
        Err(error) => RpcResponse {
            jsonrpc: "2.0".to_string(),
            result: None,
            error: Some(error),
            id: Some(id),
        },
    })
}

fn handle_set_mode(
    params: &serde_json::Value,
    view_commands: &mut Vec<ViewCommand>,
) -> Result<serde_json::Value, RpcError> {
    #[derive(Deserialize)]
    struct SetModeParams {
        mode: String,
    }

    let parsed = serde_json::from_value::<SetModeParams>(params.clone())
        .map_err(|_| RpcError::invalid_params("Expected 'mode' parameter"))?;
    let mode = ViewMode::from_string(&parsed.mode)
        .ok_or_else(|| RpcError::invalid_params(&format!("Unknown mode: {}", parsed.mode)))?;

    view_commands.push(ViewCommand::SetMode(mode));
    info!("Mode change requested: {}", mode.as_str());

    Ok(serde_json::json!({
        "success": true,
        "mode": mode.as_str()
    }))
}

fn handle_select_building(
    params: &serde_json::Value,
    context: &RpcContext,
    view_commands: &mut Vec<ViewCommand>,
) -> Result<serde_json::Value, RpcError> {
    #[derive(Deserialize)]
    struct SelectBuildingParams {
        name: Option<String>,
    }

    let parsed = serde_json::from_value::<SelectBuildingParams>(params.clone())
        .map_err(|_| RpcError::invalid_params("Expected 'name' parameter (string or null)"))?;

    if let Some(name) = &parsed.name {
        if context.graph.find_by_name(name).is_none() {
            return Err(RpcError::invalid_params(&format!("Unknown building: {}", name)));
        }
    }

    view_commands.push(ViewCommand::SelectBuilding(parsed.name.clone()));
    Ok(serde_json::json!({
        "success": true,
        "building": parsed.name
    }))
}

fn handle_select_layer(
    params: &serde_json::Value,
    view_commands: &mut Vec<ViewCommand>,
) -> Result<serde_json::Value, RpcError> {
    #[derive(Deserialize)]
    struct SelectLayerParams {
        layer: String,
    }

    let parsed = serde_json::from_value::<SelectLayerParams>(params.clone())
        .map_err(|_| RpcError::invalid_params("Expected 'layer' parameter"))?;
    if parsed.layer.is_empty() {
        return Err(RpcError::invalid_params("Layer name must not be empty"));
    }

    let layer = Layer::parse(&parsed.layer);
    view_commands.push(ViewCommand::SelectLayer(layer.clone()));
    Ok(serde_json::json!({
        "success": true,
        "layer": layer
    }))
}

fn handle_get_view_state(context: &RpcContext) -> Result<serde_json::Value, RpcError> {
    let state = serde_json::to_value(context.store.snapshot())
        .map_err(|e| RpcError::internal_error(&e.to_string()))?;
    let labels = serde_json::to_value(context.labels)
        .map_err(|e| RpcError::internal_error(&e.to_string()))?;

    Ok(serde_json::json!({
        "state": state,
        "labels": labels
    }))
}

/// Layers of the named building, or of the selected one when no name is given.
fn handle_get_building_layers(
    params: &serde_json::Value,
    context: &RpcContext,
) -> Result<serde_json::Value, RpcError> {
    #[derive(Deserialize, Default)]
    struct BuildingLayersParams {
        name: Option<String>,
    }

    let parsed = if params.is_null() {
        BuildingLayersParams::default()
    } else {
        serde_json::from_value::<BuildingLayersParams>(params.clone())
            .map_err(|_| RpcError::invalid_params("Expected optional 'name' parameter"))?
    };

    let layers = match parsed.name.as_deref() {
        Some(name) => {
            let building = context
                .graph
                .find_by_name(name)
                .ok_or_else(|| RpcError::invalid_params(&format!("Unknown building: {}", name)))?;
            building_layers(context.graph, building)
        }
        None => context.store.building_layers().to_vec(),
    };

    Ok(serde_json::json!({ "layers": layers }))
}

fn handle_get_monitor_trend(
    params: &serde_json::Value,
    context: &mut RpcContext,
) -> Result<serde_json::Value, RpcError> {
    #[derive(Deserialize)]
    struct TrendParams {
        #[serde(rename = "type")]
        kind: String,
    }

    let parsed = serde_json::from_value::<TrendParams>(params.clone())
        .map_err(|_| RpcError::invalid_params("Expected 'type' parameter"))?;
    let kind = MonitorKind::from_string(&parsed.kind)
        .ok_or_else(|| RpcError::invalid_params(&format!("Unknown monitor type: {}", parsed.kind)))?;

    Ok(serde_json::json!({
        "type": kind,
        "unit": kind.unit(),
        "points": daily_trend(kind, &mut *context.rng)
    }))
}

/// Send queued notifications and responses to the front-end.
fn send_outgoing_messages(mut rpc_interface: ResMut<WebRpcInterface>) {
    for notification in rpc_interface.outgoing_notifications.drain(..) {
        send_message_to_parent(&notification);
    }

    for response in rpc_interface.outgoing_responses.drain(..) {
        send_message_to_parent(&response);
    }
}

/// Send serialized message to the parent window.
fn send_message_to_parent<T: Serialize>(message: &T) {
    #[cfg(target_arch = "wasm32")]
    {
        match serde_json::to_string(message) {
            Ok(json) => {
                if let Some(window) = window() {
                    if let Some(parent) = window.parent().ok().flatten() {
                        if let Err(e) = parent.post_message(&JsValue::from_str(&json), "*") {
                            error!("Failed to send message to parent: {:?}", e);
                        }
                    } else {
                        warn!("No parent window available for message transmission");
                    }
                } else {
                    error!("Window object not available");
                }
            }
            Err(e) => {
                error!("Failed to serialize message: {}", e);
            }
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        let _ = message;
    }
}

/// Standard RPC error codes and constructors.
impl RpcError {
    pub fn invalid_params(message: &str) -> Self {
        Self {
            code: -32602,
            message: message.to_string(),
            data: None,
        }
    }

    pub fn internal_error(message: &str) -> Self {
        Self {
            code: -32603,
            message: message.to_string(),
            data: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::scene::graph::tests::GraphBuilder;
    use crate::view::store::StoreAction;
    use serde_json::json;

    fn request(method: &str, params: serde_json::Value) -> RpcRequest {
        RpcRequest {
            jsonrpc: "2.0".into(),
            method: method.into(),
            params,
            id: Some(json!(7)),
        }
    }

    fn graph() -> SceneGraph {
        let mut b = GraphBuilder::default();
        let building = b.group("1号楼", None, Vec3::ZERO);
        b.mesh("2F", Some(building), Vec3::ZERO);
        b.mesh("1F", Some(building), Vec3::ZERO);
        b.mesh("1号楼楼顶", Some(building), Vec3::ZERO);
        b.finish()
    }

    fn call(
        store: &ViewStore,
        req: RpcRequest,
    ) -> (Option<RpcResponse>, Vec<ViewCommand>) {
        let graph = graph();
        let labels = SceneLabels::default();
        let mut rng = ReadingSource::seeded(1).0;
        let mut context = RpcContext {
            store,
            graph: &graph,
            labels: &labels,
            rng: &mut rng,
            fps: 60.0,
        };
        let mut commands = Vec::new();
        let response = handle_rpc_request(&req, &mut context, &mut commands);
        (response, commands)
    }

    fn error_code(response: Option<RpcResponse>) -> Option<i32> {
        response.and_then(|r| r.error).map(|e| e.code)
    }

    #[test]
    fn set_mode_queues_a_command() {
        let store = ViewStore::default();
        let (response, commands) = call(&store, request("set_mode", json!({"mode": "water"})));
        assert_eq!(commands, vec![ViewCommand::SetMode(ViewMode::Water)]);
        let result = response.unwrap().result.unwrap();
        assert_eq!(result["mode"], "water");
    }

    #[test]
    fn invalid_params_use_the_standard_code() {
        let store = ViewStore::default();
        let (response, commands) = call(&store, request("set_mode", json!({"mode": "gas"})));
        assert_eq!(error_code(response), Some(-32602));
        assert!(commands.is_empty());

        let (response, _) = call(&store, request("select_building", json!({"name": "9号楼"})));
        assert_eq!(error_code(response), Some(-32602));
    }

    #[test]
    fn unknown_method_is_reported() {
        let (response, _) = call(&ViewStore::default(), request("explode", json!({})));
        assert_eq!(error_code(response), Some(-32601));
    }

    #[test]
    fn notifications_act_without_responding() {
        let mut req = request("clear_selection", serde_json::Value::Null);
        req.id = None;
        let (response, commands) = call(&ViewStore::default(), req);
        assert!(response.is_none());
        assert_eq!(commands, vec![ViewCommand::ClearSelection]);
    }

    #[test]
    fn building_selection_accepts_null() {
        let (_, commands) = call(
            &ViewStore::default(),
            request("select_building", json!({"name": null})),
        );
        assert_eq!(commands, vec![ViewCommand::SelectBuilding(None)]);
    }

    #[test]
    fn building_layers_come_from_the_graph_or_the_store() {
        let (response, _) = call(
            &ViewStore::default(),
            request("get_building_layers", json!({"name": "1号楼"})),
        );
        let result = response.unwrap().result.unwrap();
        assert_eq!(result["layers"], json!(["全楼", "1F", "2F"]));

        let store = ViewStore::default()
            .reduce(StoreAction::SetBuildingLayers(vec!["全楼".into(), "1F".into()]));
        let (response, _) = call(&store, request("get_building_layers", serde_json::Value::Null));
        assert_eq!(response.unwrap().result.unwrap()["layers"], json!(["全楼", "1F"]));
    }

    #[test]
    fn monitor_trend_has_a_point_per_hour() {
        let (response, _) = call(
            &ViewStore::default(),
            request("get_monitor_trend", json!({"type": "electric"})),
        );
        let result = response.unwrap().result.unwrap();
        assert_eq!(result["unit"], "kW");
        assert_eq!(result["points"].as_array().map(Vec::len), Some(24));
    }

    #[test]
    fn view_state_reports_mode_and_layer() {
        let store = ViewStore::default().reduce(StoreAction::SetMode(ViewMode::Floor));
        let (response, _) = call(&store, request("get_view_state", serde_json::Value::Null));
        let result = response.unwrap().result.unwrap();
        assert_eq!(result["state"]["mode"], "floor");
        assert_eq!(result["state"]["current_layer"], "全楼");
        assert!(result["labels"]["buildings"].is_array());
    }
}
