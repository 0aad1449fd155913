use std::time::Duration;

use dioxus::core::spawn_forever;
use dioxus::prelude::*;

use crate::icons::{FaCircleCheck, FaCircleExclamation, FaCircleInfo, FaXmark};
use crate::platform::sleep;
use crate::Icon;

const TOAST_TTL: Duration = Duration::from_secs(5);

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ToastLevel {
    Info,
    Success,
    Error,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Toast {
    pub id: u64,
    pub level: ToastLevel,
    pub title: String,
    pub message: String,
}

#[derive(Clone, Debug, Default)]
pub struct Toasts {
    pub entries: Vec<Toast>,
    next_id: u64,
}

impl Toasts {
    pub fn dismiss(&mut self, id: u64) {
        self.entries.retain(|t| t.id != id);
    }
}

pub fn use_toasts() -> Signal<Toasts> {
    use_context::<Signal<Toasts>>()
}

/// Show a toast that disappears on its own after a few seconds.
pub fn push_toast(toasts: &mut Signal<Toasts>, level: ToastLevel, title: &str, message: &str) {
    let id = {
        let mut list = toasts.write();
        list.next_id += 1;
        let id = list.next_id;
        list.entries.push(Toast {
            id,
            level,
            title: title.to_string(),
            message: message.to_string(),
        });
        id
    };

    // The pushing component often navigates away right after; the timer
    // must outlive it.
    let mut toasts = *toasts;
    spawn_forever(async move {
        sleep(TOAST_TTL).await;
        if let Ok(mut list) = toasts.try_write() {
            list.dismiss(id);
        }
    });
}

#[component]
pub fn ToastProvider(children: Element) -> Element {
    let toasts = use_signal(Toasts::default);
    use_context_provider(|| toasts);

    rsx! {
        {children}
        ToastViewport {}
    }
}

#[component]
fn ToastViewport() -> Element {
    let mut toasts = use_toasts();
    let entries = toasts().entries.clone();

    rsx! {
        div {
            class: "toast-viewport",
            for toast in entries {
                div {
                    key: "{toast.id}",
                    class: match toast.level {
                        ToastLevel::Error => "toast toast--error",
                        ToastLevel::Success => "toast toast--success",
                        ToastLevel::Info => "toast toast--info",
                    },
                    span {
                        class: "toast-icon",
                        match toast.level {
                            ToastLevel::Error => rsx! { Icon { icon: FaCircleExclamation, width: 16, height: 16 } },
                            ToastLevel::Success => rsx! { Icon { icon: FaCircleCheck, width: 16, height: 16 } },
                            ToastLevel::Info => rsx! { Icon { icon: FaCircleInfo, width: 16, height: 16 } },
                        }
                    }
                    div {
                        class: "toast-body",
                        strong { "{toast.title}" }
                        if !toast.message.is_empty() {
                            p { "{toast.message}" }
                        }
                    }
                    button {
                        class: "toast-close",
                        title: "Dismiss",
                        onclick: move |_| toasts.write().dismiss(toast.id),
                        Icon { icon: FaXmark, width: 12, height: 12 }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;

    thread_local! {
        static SHOWN: Cell<usize> = const { Cell::new(0) };
        static PEAK: Cell<usize> = const { Cell::new(0) };
    }

    /// Pushes one toast, then asks its parent to unmount it.
    #[component]
    fn Author(on_pushed: EventHandler<()>) -> Element {
        let mut toasts = use_toasts();
        use_effect(move || {
            push_toast(&mut toasts, ToastLevel::Success, "Community created", "");
            on_pushed.call(());
        });
        rsx! {}
    }

    #[component]
    fn Counter() -> Element {
        let toasts = use_toasts();
        let shown = toasts().entries.len();
        SHOWN.with(|s| s.set(shown));
        PEAK.with(|p| p.set(p.get().max(shown)));
        rsx! {}
    }

    fn app() -> Element {
        let mut author = use_signal(|| true);
        rsx! {
            ToastProvider {
                if author() {
                    Author { on_pushed: move |_| author.set(false) }
                }
                Counter {}
            }
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_toast_expires_after_its_author_unmounts() {
        let mut dom = VirtualDom::new(app);
        dom.rebuild_in_place();

        let deadline = tokio::time::Instant::now() + TOAST_TTL * 4;
        loop {
            let timed_out = tokio::select! {
                _ = dom.wait_for_work() => false,
                _ = tokio::time::sleep_until(deadline) => true,
            };
            if timed_out {
                break;
            }
            dom.render_immediate_to_vec();
        }

        assert_eq!(PEAK.with(Cell::get), 1);
        assert_eq!(SHOWN.with(Cell::get), 0);
    }

    #[test]
    fn test_dismiss_removes_only_that_toast() {
        let mut toasts = Toasts::default();
        for id in 1..=3 {
            toasts.entries.push(Toast {
                id,
                level: ToastLevel::Info,
                title: format!("t{id}"),
                message: String::new(),
            });
        }
        toasts.dismiss(2);
        let ids: Vec<u64> = toasts.entries.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![1, 3]);
    }
}
