//! Motivational prompts and weekly challenges
//!
//! These are decorative and chosen at random. Callers pass the RNG so tests
//! can seed it.

use rand::seq::SliceRandom;
use rand::Rng;

/// Default number of weekly challenges offered
pub const DEFAULT_CHALLENGE_COUNT: usize = 3;

pub const MOTIVATIONAL_PROMPTS: [&str; 15] = [
    "You are stronger than you think! 💪",
    "Every small step counts toward your wellness! 🌟",
    "Progress, not perfection, is the goal! ✨",
    "Your mental health journey is unique and valuable! 🧠💚",
    "Take it one day at a time, you've got this! 🌅",
    "Self-care isn't selfish, it's necessary! 💝",
    "You're doing better than you realize! 🌈",
    "Healing isn't linear, and that's okay! 🌱",
    "Your feelings are valid and important! ❤️",
    "Every moment of mindfulness matters! 🧘",
    "You deserve happiness and peace! ☮️",
    "Growth happens outside your comfort zone! 🚀",
    "Be patient with yourself during difficult times! 🤗",
    "You have overcome challenges before, you can do it again! 🦋",
    "Celebrate small wins - they add up! 🎉",
];

pub const WEEKLY_CHALLENGES: [&str; 5] = [
    "Try meditation 3 days this week!",
    "Complete 2 exercise sessions this week!",
    "Drink 8 glasses of water every day for 5 days!",
    "Sleep at least 7 hours for 4 nights!",
    "Write a daily reflection for 5 days!",
];

/// Uniform pick from [`MOTIVATIONAL_PROMPTS`]
pub fn motivational_prompt<R: Rng + ?Sized>(rng: &mut R) -> &'static str {
    MOTIVATIONAL_PROMPTS
        .choose(rng)
        .copied()
        .unwrap_or(MOTIVATIONAL_PROMPTS[0])
}

/// `count` distinct challenges in random order
pub fn weekly_challenges<R: Rng + ?Sized>(rng: &mut R, count: usize) -> Vec<&'static str> {
    WEEKLY_CHALLENGES
        .choose_multiple(rng, count)
        .copied()
        .collect()
}
