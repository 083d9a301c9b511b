//! Texts sent to teams.

/// Answer to a hint request when nothing can be released.
pub const NO_HINTS: &str = "There are no hints.";

/// Default feedback for a correct answer.
pub const GOOD_ANSWER: &str = "That is the right answer!";

/// Default feedback for a wrong answer.
pub const BAD_ANSWER: &str = "Unfortunately, that is wrong!";

/// Sent when the last sub-question of a quiz is answered.
pub const QUIZ_COMPLETE: &str = "Wow, you really know a lot!";

/// Sent after the final location of a team's chain is finished.
pub const HUNT_COMPLETED: &str = "You have successfully completed all tasks. Congratulations!";

/// Answer to any message once every location has been finished.
pub const ALL_LOCATIONS_FINISHED: &str =
    "All locations are finished. Wait for further instructions.";

/// Apology sent before a game without locations fails.
pub const NO_START_LOCATION: &str =
    "This game has no start location and therefore cannot be played.";

/// Sent to every team when the hunt is ended, and to messages afterwards.
pub const GAME_OVER: &str = "The game is over.";

/// Greeting for a new channel whose team name is not configured.
pub const ASK_TEAM_NAME: &str = "Hello! What is your team's name?";

/// Repeated while a team still has no name.
pub const WHAT_IS_TEAM_NAME: &str = "What is your team called?";

/// Name given to teams that show up after the hunt has ended.
pub const LATE_TEAM_NAME: &str = "Late team";

/// Game instructions broadcast at the start of the hunt.
pub const INSTRUCTIONS: &str = "Follow our directions!\n\
We will send you to several locations.\n\
- Every location has a QR code that you must pass on to us. Send a photo of \
the QR code in the chat, or scan it with a QR scanner and send us the text. \
Using the flash can make the code easier to read.\n\
- If the QR code matches the location where you are supposed to be, you \
receive a task from us.\n\
- Send the solution, or proof that you completed the task, in the chat and \
we will lead you to the next location.";

/// Prompt offering a hint after a wrong answer.
#[must_use]
pub fn hint_proposal(first: bool) -> &'static str {
    if first {
        "If you want a hint, send 'hint'."
    } else {
        "If you want another hint, send 'hint'."
    }
}

/// Reply to a message that does not prove presence at `location`.
#[must_use]
pub fn look_for_proof(location: &str) -> String {
    format!("Look for the QR code in {location}.")
}

/// First half of an arrival announcement.
#[must_use]
pub fn found_location(location: &str) -> String {
    format!("You have found {location}!")
}

/// Directions to the next location.
#[must_use]
pub fn go_to(location: &str, requires_proof: bool) -> String {
    if requires_proof {
        format!("Now go to {location} and scan the QR code.")
    } else {
        format!("Now go to {location}.")
    }
}

/// Directions to a team's start location, sent at the start of the hunt.
#[must_use]
pub fn start_location(location: &str, requires_proof: bool) -> String {
    if requires_proof {
        format!(
            "Your start location is {location}. Go there and scan the QR code to receive the first task."
        )
    } else {
        format!("Your start location is {location}. Go there.")
    }
}

/// Description of a quiz together with the question currently asked.
#[must_use]
pub fn quiz_question(quiz: &str, question: &str, first: bool) -> String {
    if first {
        format!("{quiz}\nThe first question: {question}")
    } else {
        format!("{quiz}\nThe current question: {question}")
    }
}

/// Announces the final quiz question.
#[must_use]
pub fn last_question(question: &str) -> String {
    format!("Last question: {question}")
}

/// Announces the next quiz question.
#[must_use]
pub fn next_question(question: &str) -> String {
    format!("Next question: {question}")
}

/// Reply on the end location before the hunt has been ended.
#[must_use]
pub fn come_to(location: &str) -> String {
    format!("Come to {location} as soon as possible!")
}

/// Confirms the name a team chose.
#[must_use]
pub fn welcome(name: &str) -> String {
    format!("Welcome, {name}!")
}

/// Roster announcement sent at the start of the hunt.
#[must_use]
pub fn roster(players: &[String]) -> String {
    format!("Your team consists of: {}.", players.join(", "))
}
