//! User-facing bot texts (Ukrainian).

use crate::domain::foundation::Timestamp;
use crate::domain::subscription::SubscriptionPlan;
use crate::ports::{ButtonAction, InlineButton, OutgoingMessage};

const DATE: &str = "%d.%m.%Y";
const DATE_TIME: &str = "%d.%m.%Y %H:%M";

pub fn payment_succeeded(period_end: Timestamp, invite_link: &str) -> OutgoingMessage {
    OutgoingMessage::text(format!(
        "✅ Платіж успішний! Ваша підписка активна до {}\n\nПриєднуйтесь до групи: {}",
        period_end.format(DATE),
        invite_link
    ))
}

pub fn subscription_renewed(period_end: Timestamp) -> OutgoingMessage {
    OutgoingMessage::text(format!(
        "✅ Підписка продовжена! Діє до {}",
        period_end.format(DATE)
    ))
}

pub fn subscription_canceled() -> OutgoingMessage {
    OutgoingMessage::text("❌ Ваша підписка була скасована. Доступ до групи припинено.")
}

pub fn subscription_expired() -> OutgoingMessage {
    OutgoingMessage::text(
        "⏰ Ваша підписка закінчилася.\n\nДля продовження доступу до групи оформіть нову підписку: /start",
    )
}

pub fn payment_failed() -> OutgoingMessage {
    OutgoingMessage::text(
        "❌ Помилка оплати підписки. Будь ласка, оновіть ваш спосіб оплати.",
    )
}

pub fn subscription_granted(period_end: Timestamp, invite_link: &str) -> OutgoingMessage {
    OutgoingMessage::text(format!(
        "✅ Вам була надана підписка до {}\n\nПриєднуйтесь до групи: {}",
        period_end.format(DATE),
        invite_link
    ))
}

pub fn subscription_buttons() -> Vec<InlineButton> {
    vec![
        InlineButton {
            text: "💳 Оформити підписку".to_string(),
            action: ButtonAction::Subscribe,
        },
        InlineButton {
            text: "ℹ️ Статус підписки".to_string(),
            action: ButtonAction::Status,
        },
    ]
}

pub fn welcome_active(period_end: Timestamp, invite_link: &str) -> OutgoingMessage {
    OutgoingMessage::text(format!(
        "✅ Привіт! У вас є активна підписка до {}\n\nВи можете приєднатися до групи: {}",
        period_end.format(DATE),
        invite_link
    ))
}

pub fn welcome_offer(plan: &SubscriptionPlan) -> OutgoingMessage {
    OutgoingMessage::text(format!(
        "👋 Привіт! Вас вітає бот підписки.\n\n💰 Вартість місячної підписки: {} {}\n📅 Тривалість: {} днів\n\nДля оформлення підписки натисніть кнопку нижче 👇",
        format_price(plan.price.as_major()),
        plan.price.currency,
        plan.period_days
    ))
    .with_buttons(subscription_buttons())
}

pub fn checkout_link(url: &str) -> OutgoingMessage {
    OutgoingMessage::text(format!(
        "💳 Для оплати підписки перейдіть за посиланням:\n\n{}\n\nПісля оплати ви автоматично отримаєте доступ до групи.",
        url
    ))
}

pub fn checkout_failed(reason: &str) -> OutgoingMessage {
    OutgoingMessage::text(format!(
        "❌ Помилка при створенні платежу: {}\n\nСпробуйте ще раз пізніше.",
        reason
    ))
}

pub fn status_active(period_end: Timestamp, invite_link: &str) -> OutgoingMessage {
    OutgoingMessage::text(format!(
        "✅ Ваша підписка активна\n📅 Діє до: {}\n\nПосилання на групу: {}",
        period_end.format(DATE_TIME),
        invite_link
    ))
}

pub fn status_none() -> OutgoingMessage {
    OutgoingMessage::text(
        "❌ У вас немає активної підписки\n\nДля оформлення підписки натисніть кнопку нижче 👇",
    )
    .with_buttons(subscription_buttons())
}

pub fn admin_denied() -> OutgoingMessage {
    OutgoingMessage::text("❌ У вас немає доступу до адміністративних команд.")
}

/// One line of the admin summary.
pub struct AdminSummaryEntry {
    pub display_name: String,
    pub period_end: Option<Timestamp>,
}

pub fn admin_summary(
    active: u64,
    canceled: u64,
    expired: u64,
    recent: &[AdminSummaryEntry],
) -> OutgoingMessage {
    let mut text = format!(
        "📊 Статистика підписок:\n\n✅ Активних: {}\n❌ Скасованих: {}\n⏰ Закінчених: {}\n\n",
        active, canceled, expired
    );
    if !recent.is_empty() {
        text.push_str("📝 Останні активні підписки:\n");
        for entry in recent {
            let end = entry
                .period_end
                .map(|t| t.format(DATE))
                .unwrap_or_else(|| "-".to_string());
            text.push_str(&format!("{} - до {}\n", entry.display_name, end));
        }
    }
    OutgoingMessage::text(text)
}

/// `9.99` stays `9.99`, `100.0` becomes `100`.
fn format_price(amount: f64) -> String {
    if amount.fract() == 0.0 {
        format!("{:.0}", amount)
    } else {
        format!("{:.2}", amount)
    }
}
