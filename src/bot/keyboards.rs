use crate::dialog::{
    Keyboard, MENU_EDIT_SHIFT, MENU_HELP, MENU_MANAGER_PENDING, MENU_MY_PENDING, MENU_MY_SHIFTS,
    MENU_NEW_SHIFT, MENU_SHEET_LINK, MENU_SUBORDINATES, SKIP_COMMENT,
};
use crate::sheets::models::Decision;
use serde_json::{json, Value};

pub fn render(keyboard: Keyboard) -> Value {
    match keyboard {
        Keyboard::ShareContact => json!({
            "keyboard": [[{ "text": "Поделиться номером", "request_contact": true }]],
            "resize_keyboard": true,
        }),
        Keyboard::Menu { manager } => menu(manager),
        Keyboard::SkipComment => json!({
            "keyboard": [[{ "text": SKIP_COMMENT }]],
            "resize_keyboard": true,
        }),
        Keyboard::Remove => json!({ "remove_keyboard": true }),
        Keyboard::Decision { shift_id } => json!({
            "inline_keyboard": [[
                {
                    "text": "Підтвердити",
                    "callback_data": format!("{}:{shift_id}", Decision::Approve.action()),
                },
                {
                    "text": "Відхилити",
                    "callback_data": format!("{}:{shift_id}", Decision::Decline.action()),
                },
            ]],
        }),
    }
}

fn menu(manager: bool) -> Value {
    let rows = if manager {
        json!([
            [{ "text": MENU_MANAGER_PENDING }, { "text": MENU_SUBORDINATES }],
            [{ "text": MENU_SHEET_LINK }],
        ])
    } else {
        json!([
            [{ "text": MENU_NEW_SHIFT }],
            [{ "text": MENU_EDIT_SHIFT }],
            [{ "text": MENU_MY_SHIFTS }, { "text": MENU_MY_PENDING }],
            [{ "text": MENU_HELP }],
        ])
    };
    json!({ "keyboard": rows, "resize_keyboard": true })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decision_buttons_round_trip_actions() {
        let markup = render(Keyboard::Decision { shift_id: 17 });
        let buttons = markup["inline_keyboard"][0].as_array().unwrap();
        let mut decisions = Vec::new();
        for button in buttons {
            let data = button["callback_data"].as_str().unwrap();
            let (action, id) = data.split_once(':').unwrap();
            decisions.push(Decision::from_action(action).unwrap());
            assert_eq!(id, "17");
        }
        assert_eq!(decisions, vec![Decision::Approve, Decision::Decline]);
    }
}
