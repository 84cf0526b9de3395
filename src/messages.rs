use crate::locale::Locale;

/// User-facing failure messages set on a store's `error`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Message {
    LoginFailed,
    RegisterFailed,
    PasswordMismatch,
    SessionExpired,
    InvalidUrl,
    ShortenFailed,
}

impl Message {
    #[must_use]
    pub fn text(self, locale: Locale) -> &'static str {
        match (self, locale) {
            (Self::LoginFailed, Locale::En) => "Login failed. Please check your credentials.",
            (Self::LoginFailed, Locale::Vi) => {
                "Đăng nhập thất bại. Vui lòng kiểm tra lại thông tin."
            }
            (Self::RegisterFailed, Locale::En) => "Registration failed. Please try again.",
            (Self::RegisterFailed, Locale::Vi) => "Đăng ký thất bại. Vui lòng thử lại.",
            (Self::PasswordMismatch, Locale::En) => "Password confirmation does not match.",
            (Self::PasswordMismatch, Locale::Vi) => "Mật khẩu xác nhận không khớp.",
            (Self::SessionExpired, Locale::En) => "Your session has expired. Please sign in again.",
            (Self::SessionExpired, Locale::Vi) => {
                "Phiên đăng nhập đã hết hạn. Vui lòng đăng nhập lại."
            }
            (Self::InvalidUrl, Locale::En) => "Please enter a valid URL.",
            (Self::InvalidUrl, Locale::Vi) => "Vui lòng nhập URL hợp lệ.",
            (Self::ShortenFailed, Locale::En) => {
                "Could not shorten the URL. Please try again."
            }
            (Self::ShortenFailed, Locale::Vi) => "Không thể rút gọn URL. Vui lòng thử lại.",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_message_is_translated() {
        let all = [
            Message::LoginFailed,
            Message::RegisterFailed,
            Message::PasswordMismatch,
            Message::SessionExpired,
            Message::InvalidUrl,
            Message::ShortenFailed,
        ];
        for message in all {
            let en = message.text(Locale::En);
            let vi = message.text(Locale::Vi);
            assert!(!en.is_empty());
            assert!(!vi.is_empty());
            assert_ne!(en, vi);
        }
    }
}
