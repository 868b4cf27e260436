//! Condition/task/schedule machine for NPC behavior.
//!
//! An NPC perceives the world into a [`ConditionSet`] each frame, then
//! works through the tasks of its current [`Schedule`] one at a time. A
//! schedule declares which conditions interrupt it; a failed task swaps
//! in a fail schedule chosen by the NPC. The machine itself carries no
//! game state, it only sequences.

/// One perceived fact about the world, refreshed every think.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Condition {
    NewEnemy,
    EnemyDead,
    CanMeleeAttack,
    PhysicsDamage,
    BlockedByDoor,
    DoorOpened,
    ChargeTargetMoved,
}

/// Bitset of active [`Condition`]s.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ConditionSet(u32);

impl ConditionSet {
    pub fn new() -> Self {
        Self(0)
    }

    pub fn set(&mut self, cond: Condition) {
        self.0 |= 1 << cond as u32;
    }

    pub fn clear_all(&mut self) {
        self.0 = 0;
    }

    pub fn has(&self, cond: Condition) -> bool {
        self.0 & (1 << cond as u32) != 0
    }

    /// Whether any of `conditions` is active.
    pub fn has_any(&self, conditions: &[Condition]) -> bool {
        conditions.iter().any(|c| self.has(*c))
    }
}

/// One step of a schedule. Payload-carrying variants hold their own
/// parameters so schedules can be plain statics.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Task {
    /// Play the anger reaction (tantrum or wall-pound).
    ExpressAnger,
    /// Turn toward the blocking door.
    YawToDoor,
    /// Pound the blocking door until it opens or the timer runs out.
    AttackDoor,
    /// Straight-line rush at the enemy's current position.
    ChargeEnemy,
    /// Pick a random nearby point and path to it.
    Wander,
    /// Path toward the current enemy.
    WalkToEnemy,
    /// Keep moving until the active route finishes.
    WaitForMovement,
    /// Turn in place toward the ideal yaw.
    FaceIdeal,
    /// Stand still for this many seconds.
    Wait(f32),
    /// Swing at the enemy in melee range.
    MeleeAttack,
}

/// Why a task gave up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailCode {
    NoEnemy,
    NoRoute,
    Stuck,
}

/// Result of starting or running one task for one think.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TaskStatus {
    Running,
    Complete,
    Failed(FailCode),
}

/// Identifies a schedule for selection and translation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduleId {
    Idle,
    ChaseEnemy,
    MeleeAttack,
    BashDoor,
    WanderAngrily,
    ChargeEnemy,
    Flinch,
    Fail,
}

/// An ordered task list plus the conditions that abort it.
#[derive(Debug)]
pub struct Schedule {
    pub id: ScheduleId,
    pub tasks: &'static [Task],
    pub interrupts: &'static [Condition],
}

/// What happened after feeding one task status into the runner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StepOutcome {
    /// Schedule still in progress.
    Continue,
    /// Last task completed; a new schedule must be selected.
    ScheduleComplete,
    /// A task failed; a fail schedule must be selected.
    ScheduleFailed(FailCode),
}

/// Sequences tasks within the current schedule. The owner perceives,
/// selects schedules, and executes tasks; the runner only tracks where
/// in the schedule the NPC is.
#[derive(Debug)]
pub struct ScheduleRunner {
    schedule: &'static Schedule,
    task_index: usize,
    task_started: bool,
}

impl ScheduleRunner {
    pub fn new(initial: &'static Schedule) -> Self {
        Self {
            schedule: initial,
            task_index: 0,
            task_started: false,
        }
    }

    pub fn schedule(&self) -> &'static Schedule {
        self.schedule
    }

    /// The task the NPC should execute this think, or `None` when the
    /// schedule has run out.
    pub fn current_task(&self) -> Option<Task> {
        self.schedule.tasks.get(self.task_index).copied()
    }

    /// Whether the current task still needs its start hook.
    pub fn needs_start(&self) -> bool {
        !self.task_started
    }

    /// Mark the current task as started.
    pub fn mark_started(&mut self) {
        self.task_started = true;
    }

    /// Whether the active condition set aborts the current schedule.
    pub fn interrupted_by(&self, conditions: &ConditionSet) -> bool {
        conditions.has_any(self.schedule.interrupts)
    }

    /// Replace the current schedule and rewind to its first task.
    pub fn switch_to(&mut self, schedule: &'static Schedule) {
        self.schedule = schedule;
        self.task_index = 0;
        self.task_started = false;
    }

    /// Feed the status of the current task back into the sequencer.
    pub fn advance(&mut self, status: TaskStatus) -> StepOutcome {
        match status {
            TaskStatus::Running => StepOutcome::Continue,
            TaskStatus::Complete => {
                self.task_index += 1;
                self.task_started = false;
                if self.task_index >= self.schedule.tasks.len() {
                    StepOutcome::ScheduleComplete
                } else {
                    StepOutcome::Continue
                }
            }
            TaskStatus::Failed(code) => StepOutcome::ScheduleFailed(code),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    static TEST_SCHEDULE: Schedule = Schedule {
        id: ScheduleId::Idle,
        tasks: &[Task::FaceIdeal, Task::Wait(1.0)],
        interrupts: &[Condition::NewEnemy],
    };

    static OTHER_SCHEDULE: Schedule = Schedule {
        id: ScheduleId::Fail,
        tasks: &[Task::Wait(0.5)],
        interrupts: &[],
    };

    #[test]
    fn condition_set_bits() {
        let mut set = ConditionSet::new();
        set.set(Condition::NewEnemy);
        set.set(Condition::BlockedByDoor);
        assert!(set.has(Condition::NewEnemy));
        assert!(!set.has(Condition::EnemyDead));
        assert!(set.has_any(&[Condition::EnemyDead, Condition::BlockedByDoor]));

        set.clear_all();
        assert_eq!(set, ConditionSet::new());
    }

    #[test]
    fn runner_walks_tasks_in_order() {
        let mut runner = ScheduleRunner::new(&TEST_SCHEDULE);
        assert_eq!(runner.current_task(), Some(Task::FaceIdeal));
        assert!(runner.needs_start());
        runner.mark_started();
        assert!(!runner.needs_start());

        assert_eq!(runner.advance(TaskStatus::Running), StepOutcome::Continue);
        assert_eq!(runner.advance(TaskStatus::Complete), StepOutcome::Continue);
        assert_eq!(runner.current_task(), Some(Task::Wait(1.0)));
        assert!(runner.needs_start());

        assert_eq!(
            runner.advance(TaskStatus::Complete),
            StepOutcome::ScheduleComplete
        );
        assert_eq!(runner.current_task(), None);
    }

    #[test]
    fn failure_reports_its_code() {
        let mut runner = ScheduleRunner::new(&TEST_SCHEDULE);
        runner.mark_started();
        assert_eq!(
            runner.advance(TaskStatus::Failed(FailCode::NoRoute)),
            StepOutcome::ScheduleFailed(FailCode::NoRoute)
        );
    }

    #[test]
    fn interrupts_and_switching() {
        let mut runner = ScheduleRunner::new(&TEST_SCHEDULE);
        let mut conds = ConditionSet::new();
        assert!(!runner.interrupted_by(&conds));
        conds.set(Condition::NewEnemy);
        assert!(runner.interrupted_by(&conds));

        runner.mark_started();
        runner.advance(TaskStatus::Complete);
        runner.switch_to(&OTHER_SCHEDULE);
        assert_eq!(runner.schedule().id, ScheduleId::Fail);
        assert_eq!(runner.current_task(), Some(Task::Wait(0.5)));
        assert!(runner.needs_start());
    }
}
