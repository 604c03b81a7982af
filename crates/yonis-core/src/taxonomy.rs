//! The 7 × 12 map of states. Single source of truth for the oracle prompt,
//! the plot layout and every lookup in the MCP server.

use crate::{Domain, State};

pub const DOMAIN_COUNT: usize = 7;
pub const STATES_PER_DOMAIN: usize = 12;
pub const STATE_COUNT: usize = DOMAIN_COUNT * STATES_PER_DOMAIN;

struct DomainSeed {
    name: &'static str,
    subtitle: &'static str,
    description: &'static str,
    color: &'static str,
    states: [(&'static str, &'static str); STATES_PER_DOMAIN],
}

const SEEDS: [DomainSeed; DOMAIN_COUNT] = [
    DomainSeed {
        name: "Tamas",
        subtitle: "Inertia",
        description: "Dense, heavy states where awareness barely registers itself. \
Movement is resisted and patterns repeat without being noticed.",
        color: "text-stone-500",
        states: [
            ("Mineral Stillness", "Existence without response. Awareness is fully dormant."),
            ("Vegetative Drift", "Growth happens to you. No intention, only process."),
            ("Torpor", "The body is awake, the will is not."),
            ("Heavy Sleep", "Escape into unconsciousness as the default refuge."),
            ("Numbness", "Feeling is switched off to avoid the cost of feeling."),
            ("Avoidance Loop", "Every demand is postponed until it disappears or explodes."),
            ("Stagnant Comfort", "Safety is bought with the refusal to change anything."),
            ("Addictive Repetition", "The same stimulus, consumed again, to not be here."),
            ("Apathy", "Nothing matters enough to move toward it."),
            ("Dull Resentment", "Blame without energy. The world owes you and never pays."),
            ("Fog of Confusion", "Inputs arrive but never resolve into meaning."),
            ("Stirring", "The first impulse to move. Discomfort becomes a signal."),
        ],
    },
    DomainSeed {
        name: "Instinct",
        subtitle: "Survival",
        description: "The operating system of the animal body. Every input is \
scanned for threat, food, mate or territory.",
        color: "text-red-500",
        states: [
            ("Hunger Drive", "Consumption is the organizing principle of the day."),
            ("Fear Reflex", "Threat detection runs hot. Safety is never confirmed."),
            ("Flight Response", "Escape before evaluation. Leaving is the only strategy."),
            ("Fight Response", "Every friction is met with force."),
            ("Scarcity Panic", "There will never be enough, so nothing can be shared."),
            ("Hoarding", "Accumulation as a shield against an imagined collapse."),
            ("Predatory Focus", "Others are resources to be acquired or removed."),
            ("Territorial Obsession", "Defending ground, status or possessions consumes all energy."),
            ("Mating Compulsion", "Attraction and conquest dictate attention."),
            ("Herd Conformity", "Safety in sameness. Deviation feels like death."),
            ("Pack Loyalty", "Belonging to the group overrides individual judgment."),
            ("Survival Cunning", "Instinct sharpened into strategy. The first glimmer of planning."),
        ],
    },
    DomainSeed {
        name: "Emotion",
        subtitle: "Bonding",
        description: "Consciousness organizes around attachment. Other people \
become the weather system of the inner world.",
        color: "text-orange-400",
        states: [
            ("Attachment Hunger", "Connection is craved but never felt as secure."),
            ("Abandonment Fear", "Every silence is read as the beginning of loss."),
            ("Jealousy", "Another's gain is experienced as your theft."),
            ("Longing", "Life is lived toward someone who is not here."),
            ("Nostalgia Loop", "The past is replayed as the only place love existed."),
            ("Grief", "Loss is the lens through which everything is seen."),
            ("Codependence", "Your state is outsourced to someone else's mood."),
            ("Tribal Belonging", "Identity dissolves into the warmth of the group."),
            ("Romantic Idealization", "The beloved is a projection screen, not a person."),
            ("Devotional Love", "Feeling is directed upward and begins to refine itself."),
            ("Empathic Overload", "Absorbing everyone's pain without a boundary."),
            ("Tender Care", "Love that gives without keeping score."),
        ],
    },
    DomainSeed {
        name: "Action",
        subtitle: "Power",
        description: "Energy turns outward into doing. The world is a system to \
be shaped, won or controlled.",
        color: "text-yellow-400",
        states: [
            ("Restless Striving", "Motion without direction. Stillness feels like failure."),
            ("Ambition", "The future self is the only one that counts."),
            ("Competitive Drive", "Worth is measured by who you beat."),
            ("Control Compulsion", "Uncertainty is intolerable, so everything is managed."),
            ("Dominance", "Power over others is mistaken for strength."),
            ("Righteous Anger", "Force justified by a cause."),
            ("Burnout", "The engine has consumed its own fuel."),
            ("Achievement Addiction", "Each win is discounted the moment it lands."),
            ("Strategic Mastery", "Power becomes skill. Effort is aimed, not sprayed."),
            ("Disciplined Will", "Action is chosen rather than compelled."),
            ("Leadership", "Power is used to move others toward a shared aim."),
            ("Builder's Purpose", "Work serves something larger than the worker."),
        ],
    },
    DomainSeed {
        name: "Cognition",
        subtitle: "Identity",
        description: "The mind builds a self and then defends it. Most humans \
oscillate between states 37 and 55.",
        color: "text-sky-400",
        states: [
            ("Self-Recognition", "The first clear sight of the pattern you are running."),
            ("Self-Image Construction", "Identity is curated, edited and displayed."),
            ("Comparison Loop", "Every encounter becomes a ranking exercise."),
            ("Status Anxiety", "Worth depends on position, so position is never safe."),
            ("Intellectual Pride", "Being right becomes the core of being someone."),
            ("Overthinking", "Analysis replaces action and never converges."),
            ("Existential Doubt", "The scaffolding of meaning starts to crack."),
            ("Skeptical Inquiry", "Beliefs are tested rather than defended."),
            ("Narrative Revision", "The life story is rewritten with fewer villains."),
            ("Meaning Seeking", "Direction is sought beyond personal gain."),
            ("Witness Emerging", "A part of you watches the thinker think."),
            ("Identity Loosening", "The self is held as a tool, not a possession."),
        ],
    },
    DomainSeed {
        name: "Wisdom",
        subtitle: "Detachment",
        description: "Awareness steps back from its contents. Rare, and stable \
only beyond state 61.",
        color: "text-violet-400",
        states: [
            ("Observer Stability", "The witness no longer collapses under pressure."),
            ("Equanimity", "Gain and loss register without throwing the system."),
            ("Non-Reactivity", "A gap opens between stimulus and response."),
            ("Discernment", "Seeing what is true beneath what is loud."),
            ("Compassionate Distance", "Caring fully without being consumed."),
            ("Simplicity", "Needs shrink until life becomes light."),
            ("Surrender", "Control is released without resignation."),
            ("Silent Knowing", "Insight arrives without the machinery of thought."),
            ("Teacher's Clarity", "Understanding can be transmitted without ego."),
            ("Effortless Action", "Doing happens without a doer pushing."),
            ("Dissolving Preference", "Like and dislike lose their grip."),
            ("Threshold of Stillness", "The last subtle identification is in view."),
        ],
    },
    DomainSeed {
        name: "Liberated",
        subtitle: "Transitional",
        description: "States at the edge of the map. Extremely rare and \
described more than inhabited.",
        color: "text-emerald-400",
        states: [
            ("Pure Presence", "Being without a story about being."),
            ("Boundless Awareness", "No edge is found between self and field."),
            ("Unity Glimpse", "Separation is seen through, if only briefly."),
            ("Spacious Emptiness", "Nothing is missing from the silence."),
            ("Radiant Peace", "Stillness that others can feel."),
            ("Choiceless Awareness", "Attention rests without selecting."),
            ("Selfless Service", "Action flows with no one to take credit."),
            ("Luminous Silence", "Mind is quiet and fully lit."),
            ("Non-Dual Seeing", "Subject and object are one movement."),
            ("Dissolution", "The last structures of identity fall away."),
            ("Return to Source", "The journey folds back into its origin."),
            ("Liberation", "The operating environment is no longer required."),
        ],
    },
];

/// Read-only table of domains and their states. Build once, share via `Arc`.
#[derive(Debug, Clone)]
pub struct Taxonomy {
    domains: Vec<Domain>,
}

impl Taxonomy {
    /// The reference 84-state map. State IDs run 1..=84 in domain order.
    pub fn standard() -> Self {
        let domains = SEEDS
            .iter()
            .enumerate()
            .map(|(d, seed)| Domain {
                id: d as u32 + 1,
                name: seed.name.to_string(),
                subtitle: seed.subtitle.to_string(),
                description: seed.description.to_string(),
                color: seed.color.to_string(),
                states: seed
                    .states
                    .iter()
                    .enumerate()
                    .map(|(k, (name, description))| State {
                        id: (d * STATES_PER_DOMAIN + k) as u32 + 1,
                        name: name.to_string(),
                        description: description.to_string(),
                    })
                    .collect(),
            })
            .collect();
        Self { domains }
    }

    pub fn domains(&self) -> &[Domain] {
        &self.domains
    }

    pub fn domain(&self, id: u32) -> Option<&Domain> {
        self.domains.iter().find(|d| d.id == id)
    }

    pub fn states(&self) -> impl Iterator<Item = &State> {
        self.domains.iter().flat_map(|d| d.states.iter())
    }

    pub fn state(&self, id: u32) -> Option<&State> {
        self.resolve(id).map(|(_, s)| s)
    }

    /// Find the (domain, state) pair owning `state_id`.
    pub fn resolve(&self, state_id: u32) -> Option<(&Domain, &State)> {
        self.domains.iter().find_map(|d| {
            d.states
                .iter()
                .find(|s| s.id == state_id)
                .map(|s| (d, s))
        })
    }

    pub fn domain_for_state(&self, state_id: u32) -> Option<&Domain> {
        self.resolve(state_id).map(|(d, _)| d)
    }

    /// Position of the state within its domain row (0..12).
    pub fn index_in_domain(&self, state_id: u32) -> Option<usize> {
        self.domain_for_state(state_id)
            .and_then(|d| d.states.iter().position(|s| s.id == state_id))
    }
}

impl Default for Taxonomy {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn every_id_resolves_exactly_once() {
        let tax = Taxonomy::standard();
        let mut seen = HashSet::new();
        for s in tax.states() {
            assert!(seen.insert(s.id), "duplicate state id {}", s.id);
        }
        assert_eq!(seen.len(), STATE_COUNT);
        for id in 1..=STATE_COUNT as u32 {
            let owners = tax
                .domains()
                .iter()
                .filter(|d| d.states.iter().any(|s| s.id == id))
                .count();
            assert_eq!(owners, 1, "state {id} owned by {owners} domains");
            assert!(tax.resolve(id).is_some());
        }
    }

    #[test]
    fn out_of_range_ids_do_not_resolve() {
        let tax = Taxonomy::standard();
        assert!(tax.resolve(0).is_none());
        assert!(tax.resolve(85).is_none());
        assert!(tax.domain(8).is_none());
    }

    #[test]
    fn ids_increase_across_domains() {
        let tax = Taxonomy::standard();
        let ids: Vec<u32> = tax.states().map(|s| s.id).collect();
        assert!(ids.windows(2).all(|w| w[0] < w[1]));
        for d in tax.domains() {
            assert_eq!(d.states.len(), STATES_PER_DOMAIN);
        }
    }

    #[test]
    fn anchor_states() {
        let tax = Taxonomy::standard();
        assert_eq!(tax.state(20).unwrap().name, "Territorial Obsession");
        assert_eq!(tax.state(49).unwrap().name, "Self-Recognition");
        assert_eq!(tax.state(52).unwrap().name, "Status Anxiety");
        assert_eq!(tax.domain_for_state(52).unwrap().name, "Cognition");
        assert_eq!(tax.index_in_domain(52), Some(3));
        assert_eq!(tax.index_in_domain(84), Some(11));
    }
}
