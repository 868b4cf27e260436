//! The shambler: a slow, melee-only NPC on the condition/task/schedule
//! machine in [`crate::ai`].
//!
//! Shamblers never run. They moan on a randomized timer, throw the
//! occasional tantrum when frustrated, bash doors that block them, and
//! sometimes blind-charge the spot where they last saw their enemy.

use engine_core::{vec_to_yaw, GameClock, Health, Team, Transform, Vec2, Vec3};
use hecs::{Entity, World};
use rand::Rng;

use crate::ai::{
    Condition, ConditionSet, FailCode, Schedule, ScheduleId, ScheduleRunner, StepOutcome, Task,
    TaskStatus,
};

/// Walking speed in world units per second.
const WALK_SPEED: f32 = 40.0;
/// Reach of a melee swing.
const MELEE_RANGE: f32 = 48.0;
/// A closed door this close and ahead blocks the shambler.
const DOOR_BLOCK_RANGE: f32 = 64.0;
/// A charge is abandoned when the enemy strays this far from the spot
/// that was charged.
const CHARGE_RESET_TOLERANCE: f32 = 60.0;
/// Close enough to a move goal to stop.
const ARRIVE_RANGE: f32 = 8.0;
/// Turn rate for facing tasks, degrees per second.
const TURN_RATE: f32 = 180.0;
/// Cooldown after a door-bash attempt before the next one may start.
const BASH_RESTART_COOLDOWN: f32 = 3.0;
/// Damage per pound on a door.
const DOOR_BASH_DAMAGE: i32 = 10;

/// Gross body animation the shambler is playing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activity {
    Idle,
    Walk,
    Run,
    MeleeAttack,
    Tantrum,
    WallPound,
}

/// Shamblers never run; every run request walks instead.
pub fn translate_activity(activity: Activity) -> Activity {
    match activity {
        Activity::Run => Activity::Walk,
        other => other,
    }
}

/// A named sound event for the audio layer (log-backed in the demo).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SoundCue {
    pub name: &'static str,
    pub position: Vec3,
}

/// A bashable door. Opens when its health runs out or the map opens it.
#[derive(Debug, Clone, Copy)]
pub struct Door {
    pub open: bool,
}

static IDLE: Schedule = Schedule {
    id: ScheduleId::Idle,
    tasks: &[Task::Wait(2.0)],
    interrupts: &[Condition::NewEnemy, Condition::PhysicsDamage],
};

static CHASE_ENEMY: Schedule = Schedule {
    id: ScheduleId::ChaseEnemy,
    tasks: &[Task::WalkToEnemy, Task::WaitForMovement],
    interrupts: &[
        Condition::NewEnemy,
        Condition::EnemyDead,
        Condition::CanMeleeAttack,
        Condition::PhysicsDamage,
        Condition::BlockedByDoor,
    ],
};

static MELEE_ATTACK: Schedule = Schedule {
    id: ScheduleId::MeleeAttack,
    tasks: &[Task::FaceIdeal, Task::MeleeAttack],
    interrupts: &[Condition::EnemyDead, Condition::PhysicsDamage],
};

static BASH_DOOR: Schedule = Schedule {
    id: ScheduleId::BashDoor,
    tasks: &[Task::YawToDoor, Task::FaceIdeal, Task::AttackDoor],
    interrupts: &[Condition::DoorOpened, Condition::EnemyDead],
};

static WANDER_ANGRILY: Schedule = Schedule {
    id: ScheduleId::WanderAngrily,
    tasks: &[Task::ExpressAnger, Task::Wander, Task::WaitForMovement],
    interrupts: &[Condition::CanMeleeAttack, Condition::PhysicsDamage],
};

static CHARGE_ENEMY: Schedule = Schedule {
    id: ScheduleId::ChargeEnemy,
    tasks: &[Task::ChargeEnemy, Task::WaitForMovement],
    interrupts: &[
        Condition::ChargeTargetMoved,
        Condition::CanMeleeAttack,
        Condition::EnemyDead,
    ],
};

static FLINCH: Schedule = Schedule {
    id: ScheduleId::Flinch,
    tasks: &[Task::Wait(0.4)],
    interrupts: &[],
};

static FAIL: Schedule = Schedule {
    id: ScheduleId::Fail,
    tasks: &[Task::Wait(1.0)],
    interrupts: &[Condition::NewEnemy, Condition::CanMeleeAttack],
};

/// Per-shambler brain state.
pub struct Shambler {
    runner: ScheduleRunner,
    conditions: ConditionSet,
    pub activity: Activity,
    activity_ends_at: f32,

    enemy: Option<Entity>,
    ideal_yaw: f32,
    move_goal: Option<Vec3>,

    /// Enemy position at the moment a charge was committed.
    charged_position: Option<Vec3>,

    blocking_door: Option<Entity>,
    bash_ends_at: f32,
    next_bash_allowed_at: f32,
    next_swing_at: f32,

    next_moan_at: f32,
    /// Scripted silence; moans retry on a short timer instead.
    pub gagged: bool,

    task_wait_until: f32,
    /// External physics impact since the last think.
    took_physics_damage: bool,
}

impl Shambler {
    pub fn new(rng: &mut impl Rng) -> Self {
        Self {
            runner: ScheduleRunner::new(&IDLE),
            conditions: ConditionSet::new(),
            activity: Activity::Idle,
            activity_ends_at: 0.0,
            enemy: None,
            ideal_yaw: 0.0,
            move_goal: None,
            charged_position: None,
            blocking_door: None,
            bash_ends_at: 0.0,
            next_bash_allowed_at: 0.0,
            next_swing_at: 0.0,
            next_moan_at: rng.gen_range(1.0..4.0),
            gagged: false,
            task_wait_until: 0.0,
            took_physics_damage: false,
        }
    }

    pub fn schedule_id(&self) -> ScheduleId {
        self.runner.schedule().id
    }

    pub fn conditions(&self) -> &ConditionSet {
        &self.conditions
    }

    /// Physics prop impact. Consumed by the next think.
    pub fn notify_physics_damage(&mut self) {
        self.took_physics_damage = true;
    }
}

/// What one think needs to know about a potential target.
#[derive(Debug, Clone, Copy)]
struct TargetView {
    entity: Entity,
    position: Vec3,
    alive: bool,
}

#[derive(Debug, Clone, Copy)]
struct DoorView {
    entity: Entity,
    position: Vec3,
    open: bool,
}

/// Drive every shambler one think. Door damage and sound cues are
/// collected and applied after the per-shambler pass.
pub fn update_shamblers(
    world: &mut World,
    clock: &GameClock,
    rng: &mut impl Rng,
    cues: &mut Vec<SoundCue>,
) {
    let targets: Vec<TargetView> = world
        .query::<(&Team, &Transform, &Health)>()
        .iter()
        .filter(|(_, (team, _, _))| **team != Team::Spectator)
        .map(|(entity, (_, transform, health))| TargetView {
            entity,
            position: transform.position,
            alive: !health.is_dead(),
        })
        .collect();

    let doors: Vec<DoorView> = world
        .query::<(&Door, &Transform)>()
        .iter()
        .map(|(entity, (door, transform))| DoorView {
            entity,
            position: transform.position,
            open: door.open,
        })
        .collect();

    let shamblers: Vec<Entity> = world
        .query::<&Shambler>()
        .iter()
        .map(|(e, _)| e)
        .collect();

    let mut door_damage: Vec<Entity> = Vec::new();

    for entity in shamblers {
        let Ok((shambler, transform, health)) =
            world.query_one_mut::<(&mut Shambler, &mut Transform, &Health)>(entity)
        else {
            continue;
        };
        if health.is_dead() {
            continue;
        }
        think(
            shambler,
            transform,
            clock,
            rng,
            &targets,
            &doors,
            cues,
            &mut door_damage,
        );
    }

    for entity in door_damage {
        let Ok((door, health)) = world.query_one_mut::<(&mut Door, &mut Health)>(entity) else {
            continue;
        };
        health.take_damage(DOOR_BASH_DAMAGE);
        if health.is_dead() {
            door.open = true;
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn think(
    shambler: &mut Shambler,
    transform: &mut Transform,
    clock: &GameClock,
    rng: &mut impl Rng,
    targets: &[TargetView],
    doors: &[DoorView],
    cues: &mut Vec<SoundCue>,
    door_damage: &mut Vec<Entity>,
) {
    let now = clock.now();
    let dt = clock.delta_seconds();

    gather_conditions(shambler, transform, now, targets, doors, rng);

    if shambler.runner.interrupted_by(&shambler.conditions) || shambler.runner.current_task().is_none()
    {
        let next = select_schedule(shambler, now);
        shambler.runner.switch_to(next);
    }

    if let Some(task) = shambler.runner.current_task() {
        let status = if shambler.runner.needs_start() {
            shambler.runner.mark_started();
            start_task(shambler, transform, task, now, rng, targets, doors, cues)
        } else {
            run_task(
                shambler,
                transform,
                task,
                now,
                dt,
                rng,
                targets,
                doors,
                cues,
                door_damage,
            )
        };
        match shambler.runner.advance(status) {
            StepOutcome::Continue => {}
            StepOutcome::ScheduleComplete => {
                let next = select_schedule(shambler, now);
                shambler.runner.switch_to(next);
            }
            StepOutcome::ScheduleFailed(code) => {
                let next = select_fail_schedule(shambler, code, now, rng);
                shambler.runner.switch_to(next);
            }
        }
    }

    update_moan(shambler, transform, now, rng, cues);
}

fn gather_conditions(
    shambler: &mut Shambler,
    transform: &Transform,
    now: f32,
    targets: &[TargetView],
    doors: &[DoorView],
    rng: &mut impl Rng,
) {
    shambler.conditions.clear_all();

    // Acquire or drop the enemy: nearest living target.
    let nearest = targets
        .iter()
        .filter(|t| t.alive)
        .min_by(|a, b| {
            let da = a.position.distance_squared(transform.position);
            let db = b.position.distance_squared(transform.position);
            da.total_cmp(&db)
        })
        .copied();

    match (shambler.enemy, nearest) {
        (None, Some(t)) => {
            shambler.enemy = Some(t.entity);
            shambler.conditions.set(Condition::NewEnemy);
            // An alert shambler holds its moan a while.
            shambler.next_moan_at = now + rng.gen_range(2.0..4.0);
        }
        (Some(old), Some(t)) if old != t.entity => {
            shambler.enemy = Some(t.entity);
            shambler.conditions.set(Condition::NewEnemy);
        }
        (Some(old), _) => {
            let still_alive = targets.iter().any(|t| t.entity == old && t.alive);
            if !still_alive {
                shambler.enemy = None;
                shambler.charged_position = None;
                shambler.conditions.set(Condition::EnemyDead);
            }
        }
        (None, None) => {}
    }

    if let Some(enemy_pos) = enemy_position(shambler, targets) {
        if enemy_pos.distance(transform.position) <= MELEE_RANGE {
            shambler.conditions.set(Condition::CanMeleeAttack);
        }
        if let Some(charged) = shambler.charged_position {
            if enemy_pos.distance(charged) > CHARGE_RESET_TOLERANCE {
                shambler.conditions.set(Condition::ChargeTargetMoved);
                shambler.charged_position = None;
            }
        }
    }

    // A closed door ahead blocks the walk.
    shambler.blocking_door = None;
    if shambler.move_goal.is_some() {
        let forward = Vec2::new(
            transform.forward().x,
            transform.forward().y,
        );
        for door in doors {
            if door.open {
                continue;
            }
            let to_door = door.position - transform.position;
            let flat = Vec2::new(to_door.x, to_door.y);
            if flat.length() <= DOOR_BLOCK_RANGE && flat.normalize_or_zero().dot(forward) > 0.5 {
                shambler.blocking_door = Some(door.entity);
                shambler.conditions.set(Condition::BlockedByDoor);
                break;
            }
        }
    }
    if shambler.blocking_door.is_none() && shambler.runner.schedule().id == ScheduleId::BashDoor {
        // The door the shambler was pounding is gone or open.
        shambler.conditions.set(Condition::DoorOpened);
    }

    if shambler.took_physics_damage {
        shambler.took_physics_damage = false;
        shambler.conditions.set(Condition::PhysicsDamage);
    }
}

fn enemy_position(shambler: &Shambler, targets: &[TargetView]) -> Option<Vec3> {
    let enemy = shambler.enemy?;
    targets
        .iter()
        .find(|t| t.entity == enemy && t.alive)
        .map(|t| t.position)
}

fn select_schedule(shambler: &Shambler, now: f32) -> &'static Schedule {
    if shambler.conditions.has(Condition::PhysicsDamage) {
        return &FLINCH;
    }
    if shambler.conditions.has(Condition::BlockedByDoor)
        && shambler.blocking_door.is_some()
        && now >= shambler.next_bash_allowed_at
    {
        return &BASH_DOOR;
    }
    if shambler.conditions.has(Condition::CanMeleeAttack) {
        return &MELEE_ATTACK;
    }
    if shambler.enemy.is_some() {
        return &CHASE_ENEMY;
    }
    &IDLE
}

/// Failure recovery: a blocking door gets bashed, otherwise half the time
/// the shambler blind-charges where it last knew the enemy to be, and
/// the rest of the time it stomps off angrily.
fn select_fail_schedule(
    shambler: &mut Shambler,
    _code: FailCode,
    now: f32,
    rng: &mut impl Rng,
) -> &'static Schedule {
    if shambler.blocking_door.is_some() && now >= shambler.next_bash_allowed_at {
        return &BASH_DOOR;
    }
    if shambler.enemy.is_some() && rng.gen_bool(0.5) {
        return &CHARGE_ENEMY;
    }
    if shambler.enemy.is_some() {
        return &WANDER_ANGRILY;
    }
    &FAIL
}

#[allow(clippy::too_many_arguments)]
fn start_task(
    shambler: &mut Shambler,
    transform: &mut Transform,
    task: Task,
    now: f32,
    rng: &mut impl Rng,
    targets: &[TargetView],
    doors: &[DoorView],
    cues: &mut Vec<SoundCue>,
) -> TaskStatus {
    match task {
        Task::Wait(duration) => {
            shambler.task_wait_until = now + duration;
            shambler.activity = Activity::Idle;
            TaskStatus::Running
        }
        Task::FaceIdeal => TaskStatus::Running,
        Task::YawToDoor => {
            let Some(door) = shambler
                .blocking_door
                .and_then(|d| doors.iter().find(|v| v.entity == d))
            else {
                return TaskStatus::Failed(FailCode::NoRoute);
            };
            let to_door = door.position - transform.position;
            shambler.ideal_yaw = vec_to_yaw(Vec2::new(to_door.x, to_door.y));
            TaskStatus::Complete
        }
        Task::AttackDoor => {
            shambler.bash_ends_at = now + rng.gen_range(2.0..6.0);
            shambler.next_swing_at = now;
            shambler.activity = Activity::WallPound;
            cues.push(SoundCue {
                name: "shambler.angry",
                position: transform.position,
            });
            TaskStatus::Running
        }
        Task::ExpressAnger => {
            // Mostly a wall-pound; one in four times a full tantrum.
            shambler.activity = if rng.gen_range(0..4) == 0 {
                Activity::Tantrum
            } else {
                Activity::WallPound
            };
            shambler.activity_ends_at = now + 1.0;
            cues.push(SoundCue {
                name: "shambler.angry",
                position: transform.position,
            });
            TaskStatus::Running
        }
        Task::WalkToEnemy => match enemy_position(shambler, targets) {
            Some(pos) => {
                shambler.move_goal = Some(pos);
                shambler.activity = translate_activity(Activity::Run);
                TaskStatus::Complete
            }
            None => TaskStatus::Failed(FailCode::NoEnemy),
        },
        Task::ChargeEnemy => match enemy_position(shambler, targets) {
            Some(pos) => {
                shambler.move_goal = Some(pos);
                shambler.charged_position = Some(pos);
                shambler.activity = translate_activity(Activity::Run);
                TaskStatus::Complete
            }
            None => TaskStatus::Failed(FailCode::NoEnemy),
        },
        Task::Wander => {
            let offset = Vec3::new(
                rng.gen_range(-200.0..200.0),
                rng.gen_range(-200.0..200.0),
                0.0,
            );
            shambler.move_goal = Some(transform.position + offset);
            shambler.activity = Activity::Walk;
            TaskStatus::Complete
        }
        Task::WaitForMovement => {
            if shambler.move_goal.is_none() {
                TaskStatus::Complete
            } else {
                TaskStatus::Running
            }
        }
        Task::MeleeAttack => match enemy_position(shambler, targets) {
            Some(pos) if pos.distance(transform.position) <= MELEE_RANGE => {
                shambler.activity = Activity::MeleeAttack;
                shambler.next_swing_at = now + 0.6;
                // One in three swings is the heavy two-handed bash.
                let cue = if rng.gen_range(0..3) == 0 {
                    "shambler.bash"
                } else {
                    "shambler.swing"
                };
                cues.push(SoundCue {
                    name: cue,
                    position: transform.position,
                });
                TaskStatus::Running
            }
            _ => TaskStatus::Failed(FailCode::NoEnemy),
        },
    }
}

#[allow(clippy::too_many_arguments)]
fn run_task(
    shambler: &mut Shambler,
    transform: &mut Transform,
    task: Task,
    now: f32,
    dt: f32,
    rng: &mut impl Rng,
    targets: &[TargetView],
    doors: &[DoorView],
    cues: &mut Vec<SoundCue>,
    door_damage: &mut Vec<Entity>,
) -> TaskStatus {
    match task {
        Task::Wait(_) => {
            if now >= shambler.task_wait_until {
                TaskStatus::Complete
            } else {
                TaskStatus::Running
            }
        }
        Task::FaceIdeal => {
            if turn_toward(transform, shambler.ideal_yaw, dt) {
                TaskStatus::Complete
            } else {
                TaskStatus::Running
            }
        }
        Task::ExpressAnger => {
            if now >= shambler.activity_ends_at {
                shambler.activity = Activity::Idle;
                TaskStatus::Complete
            } else {
                TaskStatus::Running
            }
        }
        Task::AttackDoor => {
            let Some(door) = shambler.blocking_door else {
                return TaskStatus::Complete;
            };
            if doors.iter().any(|d| d.entity == door && d.open) {
                return TaskStatus::Complete;
            }
            if now >= shambler.next_swing_at {
                shambler.next_swing_at = now + 1.0;
                door_damage.push(door);
                cues.push(SoundCue {
                    name: "shambler.bash",
                    position: transform.position,
                });
            }
            if now >= shambler.bash_ends_at {
                shambler.next_bash_allowed_at = now + BASH_RESTART_COOLDOWN;
                shambler.activity = Activity::Idle;
                TaskStatus::Complete
            } else {
                TaskStatus::Running
            }
        }
        Task::WaitForMovement => {
            let Some(goal) = shambler.move_goal else {
                return TaskStatus::Complete;
            };
            // Walking into a closed door stalls the route.
            let blocked = shambler
                .blocking_door
                .and_then(|d| doors.iter().find(|v| v.entity == d && !v.open))
                .is_some_and(|d| d.position.distance(transform.position) <= ARRIVE_RANGE * 2.0);
            if blocked {
                shambler.activity = Activity::Idle;
                return TaskStatus::Failed(FailCode::Stuck);
            }
            let to_goal = Vec3::new(goal.x - transform.position.x, goal.y - transform.position.y, 0.0);
            if to_goal.length() <= ARRIVE_RANGE {
                shambler.move_goal = None;
                shambler.activity = Activity::Idle;
                return TaskStatus::Complete;
            }
            let dir = to_goal.normalize_or_zero();
            transform.position += dir * WALK_SPEED * dt;
            transform.yaw = vec_to_yaw(Vec2::new(dir.x, dir.y));
            TaskStatus::Running
        }
        Task::MeleeAttack => {
            if now >= shambler.next_swing_at {
                shambler.activity = Activity::Idle;
                TaskStatus::Complete
            } else {
                TaskStatus::Running
            }
        }
        // These complete in their start hook; re-running restarts them.
        Task::YawToDoor | Task::WalkToEnemy | Task::ChargeEnemy | Task::Wander => {
            start_task(shambler, transform, task, now, rng, targets, doors, cues)
        }
    }
}

/// Turn toward `ideal` at the fixed turn rate. Returns true when aligned.
fn turn_toward(transform: &mut Transform, ideal: f32, dt: f32) -> bool {
    let mut diff = (ideal - transform.yaw).rem_euclid(360.0);
    if diff > 180.0 {
        diff -= 360.0;
    }
    if diff.abs() <= 5.0 {
        transform.yaw = ideal;
        return true;
    }
    let step = TURN_RATE * dt;
    transform.yaw += diff.signum() * step.min(diff.abs());
    false
}

/// Idle moaning: first moan 1-4 s after spawn, 2-5 s between moans, and
/// a short 1-2 s retry while gagged.
fn update_moan(
    shambler: &mut Shambler,
    transform: &Transform,
    now: f32,
    rng: &mut impl Rng,
    cues: &mut Vec<SoundCue>,
) {
    if now < shambler.next_moan_at {
        return;
    }
    if shambler.gagged {
        shambler.next_moan_at = now + rng.gen_range(1.0..2.0);
        return;
    }
    cues.push(SoundCue {
        name: "shambler.moan",
        position: transform.position,
    });
    shambler.next_moan_at = now + rng.gen_range(2.0..5.0);
}
