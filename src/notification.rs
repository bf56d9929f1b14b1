use service_protos::ubo::v1::{
    action, notification, notification_dispatch_item, Action, Chime, KeypadKeyPressAction, Key,
    Notification, NotificationDispatchItem, NotificationsAddAction,
};

/// Announces a newly connected client: a notification with a single action
/// item that presses HOME on the device.
pub fn sample_notification(title: &str, content: &str) -> Action {
    let home = notification_dispatch_item::Operation {
        operation: Some(
            notification_dispatch_item::operation::Operation::KeypadKeyPressAction(
                KeypadKeyPressAction {
                    key: Key::Home as i32,
                    time: 0.0,
                },
            ),
        ),
    };

    let item = notification::ActionsItem {
        item: Some(notification::actions_item::Item::NotificationDispatchItem(
            NotificationDispatchItem {
                label: "custom action".to_string(),
                color: "#ff0000".to_string(),
                background_color: "#00ff00".to_string(),
                icon: "󰑣".to_string(),
                operation: Some(home),
            },
        )),
    };

    Action {
        action: Some(action::Action::NotificationsAddAction(
            NotificationsAddAction {
                notification: Some(Notification {
                    title: title.to_string(),
                    content: content.to_string(),
                    color: "#ff0000".to_string(),
                    chime: Chime::Done as i32,
                    actions: Some(notification::Actions { items: vec![item] }),
                }),
            },
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_notification() {
        let action = sample_notification("Hello", "Rust client connected.");

        let Some(action::Action::NotificationsAddAction(add)) = action.action else {
            panic!("expected a notifications add action");
        };
        let notification = add.notification.unwrap();
        assert_eq!(notification.title, "Hello");
        assert_eq!(notification.content, "Rust client connected.");
        assert_eq!(notification.chime(), Chime::Done);

        let items = notification.actions.unwrap().items;
        assert_eq!(items.len(), 1);
        let Some(notification::actions_item::Item::NotificationDispatchItem(item)) =
            items[0].item.clone()
        else {
            panic!("expected a dispatch item");
        };
        assert_eq!(item.label, "custom action");
        assert_eq!(item.background_color, "#00ff00");

        let Some(notification_dispatch_item::operation::Operation::KeypadKeyPressAction(press)) =
            item.operation.unwrap().operation
        else {
            panic!("expected a keypad press");
        };
        assert_eq!(press.key(), Key::Home);
    }
}
