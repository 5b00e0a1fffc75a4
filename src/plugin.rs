use std::sync::Arc;

use bevy::{
    prelude::*,
    tasks::{AsyncComputeTaskPool, Task, block_on, futures_lite::future},
};

use crate::{
    error::Result,
    pipeline::{GeneratedVolume, Pipeline, PipelineConfig},
};

/// System sets for the blend-field pipeline.
///
/// ```text
/// BlendFieldSet::Spawn  →  [async compute]  →  BlendFieldSet::Generate  →  [your systems]
/// ```
///
/// Order your meshing or upload systems after [`BlendFieldSet::Generate`] to pick up
/// fresh [`BlendVolume`]s in the same frame.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum BlendFieldSet {
    /// Starts an async volume job for each [`VolumeRequest`].
    Spawn,
    /// Polls jobs, commits finished volumes to the [`BlendSession`] and inserts [`BlendVolume`].
    Generate,
}

/// The blending session shared by all systems.
///
/// Drive it directly from your own systems (`map`, `register_points`, ...) and spawn a
/// [`VolumeRequest`] to regenerate the volume without blocking the frame.
#[derive(Resource)]
pub struct BlendSession(pub Pipeline);

/// Marker component requesting a volume generation.
///
/// Removed once the job finishes, whether it succeeded or not.
#[derive(Component)]
pub struct VolumeRequest;

/// Holds the in-flight volume job for a [`VolumeRequest`] entity.
#[derive(Component)]
pub struct VolumeTask(Task<Result<GeneratedVolume>>);

/// A finished volume, ready for isosurface extraction or direct visualization.
#[derive(Component, Clone)]
pub struct BlendVolume(pub Arc<GeneratedVolume>);

/// Bevy plugin that owns a [`Pipeline`] and generates volumes on Bevy's
/// `AsyncComputeTaskPool`:
///
/// ```text
/// VolumeRequest spawned
///   → VolumeTask inserted           (BlendFieldSet::Spawn)
///   → [async compute runs]
///   → BlendSession committed,
///     BlendVolume inserted          (BlendFieldSet::Generate)
///   → VolumeRequest + VolumeTask removed
/// ```
#[derive(Default)]
pub struct BlendFieldPlugin {
    /// Configuration for the session's [`Pipeline`].
    pub config: PipelineConfig,
}

impl Plugin for BlendFieldPlugin {
    fn build(&self, app: &mut App) {
        match Pipeline::new(self.config.clone()) {
            Ok(pipeline) => {
                app.insert_resource(BlendSession(pipeline));
            }
            Err(err) => {
                error!("blend pipeline not created: {err}");
                return;
            }
        }

        app.configure_sets(Update, (BlendFieldSet::Spawn, BlendFieldSet::Generate).chain())
            .add_systems(
                Update,
                (
                    spawn_volume_tasks.in_set(BlendFieldSet::Spawn),
                    poll_volume_tasks.in_set(BlendFieldSet::Generate),
                ),
            );
    }
}

/// Starts an async [`VolumeJob`](crate::pipeline::VolumeJob) for every pending [`VolumeRequest`].
fn spawn_volume_tasks(
    mut commands: Commands,
    session: Res<BlendSession>,
    query: Query<Entity, (With<VolumeRequest>, Without<VolumeTask>)>,
) {
    let task_pool = AsyncComputeTaskPool::get();

    for entity in query.iter() {
        let job = session.0.volume_job();
        let task = task_pool.spawn(async move { job.run() });
        commands.entity(entity).insert(VolumeTask(task));
    }
}

/// Polls in-flight [`VolumeTask`]s each frame.
///
/// Non-blocking: unfinished tasks are retried next frame.
fn poll_volume_tasks(
    mut commands: Commands,
    mut session: ResMut<BlendSession>,
    mut query: Query<(Entity, &mut VolumeTask)>,
) {
    for (entity, mut volume_task) in query.iter_mut() {
        let Some(outcome) = block_on(future::poll_once(&mut volume_task.0)) else {
            continue;
        };

        let mut entity_commands = commands.entity(entity);
        entity_commands.remove::<(VolumeTask, VolumeRequest)>();
        match outcome.and_then(|generated| session.0.commit(generated)) {
            Ok(generated) => {
                entity_commands.insert(BlendVolume(generated));
            }
            Err(err) => warn!("volume generation failed: {err}"),
        }
    }
}
