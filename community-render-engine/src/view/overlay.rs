//! Native-only UI: projected scene labels, the monitor tooltip and an FPS counter.
//!
//! Web builds leave all of this to the front-end, which receives the same data over RPC.

use super::commands::{ViewCommand, ViewCommandEvent, ViewCommandSource};
use super::labels::{LabelTarget, SceneLabels};
use super::store::{Layer, TooltipData, ViewStore};
use crate::engine::scene::materials::hex_colour;
use crate::engine::scene::naming::MonitorKind;
use bevy::diagnostic::{DiagnosticsStore, FrameTimeDiagnosticsPlugin};
use bevy::prelude::*;
use constants::palette::{READING_ALARM_COLOUR, READING_NORMAL_COLOUR};

#[derive(Component)]
pub struct OverlayRoot;

#[derive(Component)]
pub struct FpsText;

#[derive(Component)]
pub struct TooltipText;

/// UI node pinned to a world-space anchor.
#[derive(Component, Debug, Clone)]
pub struct LabelNode {
    pub anchor: Vec3,
    pub target: LabelTarget,
}

pub fn create_native_overlays(mut commands: Commands) {
    commands
        .spawn((
            Node {
                width: Val::Percent(100.0),
                height: Val::Percent(100.0),
                ..default()
            },
            OverlayRoot,
        ))
        .with_children(|parent| {
            parent.spawn((
                Text::new("FPS: "),
                TextFont {
                    font_size: 16.0,
                    ..default()
                },
                TextColor(Color::srgb(1., 0., 0.)),
                Node {
                    position_type: PositionType::Absolute,
                    bottom: Val::Px(12.0),
                    right: Val::Px(12.0),
                    ..default()
                },
                FpsText,
            ));
            parent.spawn((
                Text::default(),
                TextFont {
                    font_size: 14.0,
                    ..default()
                },
                TextColor(Color::WHITE),
                BackgroundColor(Color::srgba(0.0, 0.1, 0.2, 0.8)),
                Node {
                    position_type: PositionType::Absolute,
                    padding: UiRect::all(Val::Px(8.0)),
                    ..default()
                },
                Visibility::Hidden,
                TooltipText,
            ));
        });
}

/// Respawn label nodes whenever the label set changes.
pub fn rebuild_label_nodes(
    mut commands: Commands,
    labels: Res<SceneLabels>,
    existing: Query<Entity, With<LabelNode>>,
    root: Query<Entity, With<OverlayRoot>>,
) {
    if !labels.is_changed() {
        return;
    }
    for entity in &existing {
        commands.entity(entity).despawn();
    }
    let Ok(root) = root.single() else {
        return;
    };

    commands.entity(root).with_children(|parent| {
        for anchor in labels.anchors() {
            let background = match anchor.target {
                LabelTarget::Monitor => Color::srgba(0.0, 0.0, 0.0, 0.6),
                LabelTarget::Building(_) => Color::srgba(0.15, 0.39, 0.92, 0.8),
                LabelTarget::Floor(_) => Color::srgba(0.0, 0.2, 0.4, 0.8),
            };
            parent.spawn((
                Button,
                Node {
                    position_type: PositionType::Absolute,
                    padding: UiRect::axes(Val::Px(8.0), Val::Px(4.0)),
                    ..default()
                },
                BackgroundColor(background),
                Visibility::Hidden,
                LabelNode {
                    anchor: anchor.position,
                    target: anchor.target,
                },
                children![(
                    Text::new(anchor.text),
                    TextFont {
                        font_size: 13.0,
                        ..default()
                    },
                    TextColor(Color::WHITE),
                )],
            ));
        }
    });
}

/// Project each label anchor into the viewport.
pub fn position_label_nodes(
    camera_query: Query<(&Camera, &GlobalTransform), With<Camera3d>>,
    mut nodes: Query<(&LabelNode, &mut Node, &mut Visibility)>,
) {
    let Ok((camera, camera_transform)) = camera_query.single() else {
        return;
    };
    for (label, mut node, mut visibility) in &mut nodes {
        match camera.world_to_viewport(camera_transform, label.anchor) {
            Ok(screen) => {
                node.left = Val::Px(screen.x);
                node.top = Val::Px(screen.y);
                *visibility = Visibility::Inherited;
            }
            Err(_) => *visibility = Visibility::Hidden,
        }
    }
}

pub fn handle_label_clicks(
    interactions: Query<(&Interaction, &LabelNode), Changed<Interaction>>,
    mut view_commands: EventWriter<ViewCommandEvent>,
) {
    for (interaction, label) in &interactions {
        if *interaction != Interaction::Pressed {
            continue;
        }
        let command = match &label.target {
            LabelTarget::Building(name) => ViewCommand::SelectBuilding(Some(name.clone())),
            LabelTarget::Floor(name) => ViewCommand::SelectLayer(Layer::parse(name)),
            LabelTarget::Monitor => continue,
        };
        view_commands.write(ViewCommandEvent {
            command,
            source: ViewCommandSource::Overlay,
        });
    }
}

pub fn tooltip_text(tooltip: &TooltipData) -> String {
    let unit = tooltip
        .kind
        .as_deref()
        .and_then(MonitorKind::from_string)
        .map_or("", MonitorKind::unit);
    format!(
        "{}\n{} {} {}\n{} {}",
        tooltip.name.as_deref().unwrap_or_default(),
        tooltip.building.as_deref().unwrap_or_default(),
        tooltip.layer.as_deref().unwrap_or_default(),
        tooltip.room.as_deref().unwrap_or_default(),
        tooltip.value.unwrap_or_default(),
        unit,
    )
}

pub fn reading_colour(tooltip: &TooltipData) -> Color {
    if tooltip.abnormal {
        hex_colour(READING_ALARM_COLOUR)
    } else {
        hex_colour(READING_NORMAL_COLOUR)
    }
}

pub fn update_tooltip_overlay(
    store: Res<ViewStore>,
    mut query: Query<
        (&mut Text, &mut TextColor, &mut Node, &mut Visibility),
        With<TooltipText>,
    >,
) {
    if !store.is_changed() {
        return;
    }
    let tooltip = store.tooltip();
    for (mut text, mut colour, mut node, mut visibility) in &mut query {
        if !tooltip.show {
            *visibility = Visibility::Hidden;
            continue;
        }
        text.0 = tooltip_text(tooltip);
        colour.0 = reading_colour(tooltip);
        if let Some([x, y]) = tooltip.screen {
            node.left = Val::Px(x + 12.0);
            node.top = Val::Px(y + 12.0);
        }
        *visibility = Visibility::Inherited;
    }
}

pub fn fps_text_update_system(
    diagnostics: Res<DiagnosticsStore>,
    mut query: Query<&mut Text, With<FpsText>>,
) {
    for mut text in &mut query {
        if let Some(fps) = diagnostics.get(&FrameTimeDiagnosticsPlugin::FPS) {
            if let Some(value) = fps.smoothed() {
                text.0 = format!("FPS: {value:.1}");
            }
        }
    }
}
