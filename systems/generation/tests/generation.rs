use std::collections::HashMap;

use runner_track_core::{
    Command, EntityHandle, EntityKind, EntityPool, Event, PlatformId, PlatformRole, Placement,
    TemplateId,
};
use runner_track_system_generation::{Generation, GenerationConfig, GenerationContext};
use runner_track_world::{self as world, query, Track};

#[derive(Default)]
struct CountingPool {
    next: u64,
    attached: HashMap<EntityHandle, (PlatformId, Placement)>,
}

impl EntityPool for CountingPool {
    fn acquire(&mut self, _kind: EntityKind) -> EntityHandle {
        self.next += 1;
        EntityHandle::new(self.next)
    }

    fn attach(&mut self, handle: EntityHandle, platform: PlatformId, placement: &Placement) {
        let _ = self.attached.insert(handle, (platform, *placement));
    }

    fn release(&mut self, handle: EntityHandle) {
        let _ = self.attached.remove(&handle);
    }

    fn clear(&mut self, kind: EntityKind) {
        self.attached.retain(|_, (_, placement)| placement.kind != kind);
    }
}

struct Scenario {
    track: Track,
    generation: Generation,
    context: GenerationContext,
    pool: CountingPool,
    events: Vec<Event>,
}

impl Scenario {
    fn new(config: GenerationConfig, seed: u64) -> Self {
        let mut scenario = Self {
            track: Track::default(),
            generation: Generation::new(config),
            context: GenerationContext::from_seed(seed),
            pool: CountingPool::default(),
            events: Vec::new(),
        };
        world::apply(
            &mut scenario.track,
            Command::SpawnInitialPlatform {
                template: TemplateId::new(0),
            },
            &mut scenario.events,
        );
        scenario.step();
        scenario
    }

    fn step(&mut self) {
        let mut commands = Vec::new();
        self.generation.handle(
            &mut self.context,
            &self.events,
            &self.track,
            &mut self.pool,
            &mut commands,
        );
        self.events.clear();
        for command in commands {
            world::apply(&mut self.track, command, &mut self.events);
        }
    }

    fn extend(&mut self) {
        let Some(command) = self.generation.plan_batch(&mut self.context, &self.track) else {
            return;
        };
        self.events.clear();
        world::apply(&mut self.track, command, &mut self.events);
        self.step();
    }
}

#[test]
fn generated_platforms_receive_patterns() {
    let mut scenario = Scenario::new(GenerationConfig::default(), 0x00c0_ffee);
    scenario.extend();

    let applied = scenario
        .events
        .iter()
        .filter(|event| matches!(event, Event::PatternApplied { .. }))
        .count();
    assert_eq!(applied, 3);
    assert_eq!(scenario.context.history().len(), 2);

    for platform in query::platforms(&scenario.track) {
        match platform.role() {
            PlatformRole::Initial => {
                assert!(platform.pattern().is_none());
                assert!(platform.entities().is_empty());
            }
            PlatformRole::Generated => {
                assert!(platform.pattern().is_some());
                for handle in platform.entities() {
                    let (owner, _) = scenario.pool.attached[handle];
                    assert_eq!(owner, platform.id());
                }
            }
        }
    }

    let recorded: usize = query::platforms(&scenario.track)
        .map(|platform| platform.entities().len())
        .sum();
    assert_eq!(recorded, scenario.pool.attached.len());
}

#[test]
fn placements_stay_on_their_platform() {
    let mut scenario = Scenario::new(GenerationConfig::default(), 77);
    for _ in 0..3 {
        scenario.extend();
    }
    assert_eq!(query::platform_count(&scenario.track), 9);

    for (owner, placement) in scenario.pool.attached.values() {
        let platform = query::platform(&scenario.track, *owner).expect("owner on track");
        let geometry = platform.geometry();
        let half_width = geometry.width() / 2.0;
        assert!((placement.position.x - geometry.lateral_center()).abs() <= half_width);
        assert!(placement.position.z >= geometry.near_bound());
    }
}

#[test]
fn missing_hazard_templates_leave_platforms_empty() {
    let config = GenerationConfig {
        hazard_templates: Vec::new(),
        ..GenerationConfig::default()
    };
    let mut scenario = Scenario::new(config, 5);
    scenario.extend();

    assert_eq!(query::platform_count(&scenario.track), 4);
    assert!(scenario.context.history().is_empty());
    assert!(scenario.pool.attached.is_empty());
    assert!(query::platforms(&scenario.track).all(|platform| platform.pattern().is_none()));
}

#[test]
fn same_seed_replays_identically() {
    let run = |seed| {
        let mut scenario = Scenario::new(GenerationConfig::default(), seed);
        scenario.extend();
        scenario.extend();
        query::platforms(&scenario.track)
            .map(|platform| {
                let placements: Vec<Placement> = platform
                    .entities()
                    .iter()
                    .map(|handle| scenario.pool.attached[handle].1)
                    .collect();
                (platform.id(), platform.pattern(), placements)
            })
            .collect::<Vec<_>>()
    };
    assert_eq!(run(42), run(42));
}
