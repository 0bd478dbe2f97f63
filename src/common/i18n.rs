// src/common/i18n.rs

use std::collections::HashMap;

// Catálogo de mensagens: (locale, chave) -> texto.
// O sistema atende usuários em árabe; inglês é o fallback para clientes
// de API. O core nunca formata texto, só produz as chaves.
#[derive(Clone)]
pub struct I18nStore {
    messages: HashMap<(&'static str, &'static str), &'static str>,
}

const DEFAULT_LOCALE: &str = "ar";

impl I18nStore {
    pub fn new() -> Self {
        let mut m = HashMap::new();

        // --- Erros ---
        m.insert(("ar", "validation"), "حقل واحد أو أكثر غير صالح");
        m.insert(("en", "validation"), "One or more fields are invalid.");

        m.insert(("ar", "invalid_credentials"), "اسم المستخدم أو كلمة المرور غير صحيحة");
        m.insert(("en", "invalid_credentials"), "Invalid username or password.");

        m.insert(("ar", "invalid_token"), "يجب تسجيل الدخول للوصول إلى هذه الصفحة");
        m.insert(("en", "invalid_token"), "Authentication token is missing or invalid.");

        m.insert(("ar", "user_not_found"), "المستخدم غير موجود");
        m.insert(("en", "user_not_found"), "User no longer exists, please sign in again.");

        m.insert(("ar", "not_authorized"), "ليس لديك صلاحية لتنفيذ هذا الإجراء");
        m.insert(("en", "not_authorized"), "You are not allowed to perform this action.");

        // Mesmo texto para "não existe" e "fora do seu escopo", de propósito.
        m.insert(("ar", "not_found"), "السجل غير موجود أو ليس لديك صلاحية للوصول إليه");
        m.insert(("en", "not_found"), "Record not found or not accessible.");

        m.insert(("ar", "invalid_stage"), "خطوة الدفع غير صحيحة");
        m.insert(("en", "invalid_stage"), "Unknown payment stage.");

        m.insert(("ar", "already_paid"), "هذه الخطوة مدفوعة بالفعل");
        m.insert(("en", "already_paid"), "This stage is already marked as paid.");

        m.insert(("ar", "stage_order"), "لا يمكن دفع هذه الخطوة قبل الخطوات السابقة");
        m.insert(("en", "stage_order"), "Earlier stages must be paid first.");

        m.insert(("ar", "unique_violation"), "القيمة مستخدمة بالفعل");
        m.insert(("en", "unique_violation"), "Value already in use.");

        m.insert(("ar", "internal"), "حدث خطأ غير متوقع");
        m.insert(("en", "internal"), "An unexpected error occurred.");

        // --- Sucessos ---
        m.insert(("ar", "created"), "تم الإنشاء بنجاح");
        m.insert(("en", "created"), "Created successfully.");

        m.insert(("ar", "updated"), "تم التحديث بنجاح");
        m.insert(("en", "updated"), "Updated successfully.");

        m.insert(("ar", "deleted"), "تم الحذف بنجاح");
        m.insert(("en", "deleted"), "Deleted successfully.");

        m.insert(("ar", "payment_marked"), "تم تحديث حالة الدفع: {stage}");
        m.insert(("en", "payment_marked"), "Payment stage marked: {stage}");

        m.insert(("ar", "payment_unmarked"), "تم إلغاء حالة الدفع: {stage}");
        m.insert(("en", "payment_unmarked"), "Payment stage unmarked: {stage}");

        m.insert(("ar", "bulk_paid"), "تم تحديث {count} فاتورة لـ \"{name}\" كمدفوعة");
        m.insert(("en", "bulk_paid"), "Marked {count} invoices for \"{name}\" as paid.");

        m.insert(("ar", "nothing_to_pay"), "لا توجد فواتير جاهزة للدفع");
        m.insert(("en", "nothing_to_pay"), "No invoices are ready for payment.");

        // Nomes das etapas, usados nos placeholders acima.
        m.insert(("ar", "stage_client_to_distributor"), "العميل → الموزع");
        m.insert(("en", "stage_client_to_distributor"), "client → distributor");
        m.insert(("ar", "stage_distributor_to_admin"), "الموزع → الإدارة");
        m.insert(("en", "stage_distributor_to_admin"), "distributor → administration");
        m.insert(("ar", "stage_admin_to_company"), "الإدارة → الشركة");
        m.insert(("en", "stage_admin_to_company"), "administration → company");

        Self { messages: m }
    }

    pub fn text(&self, locale: &str, key: &'static str) -> String {
        self.messages
            .get(&(Self::normalize(locale), key))
            .or_else(|| self.messages.get(&(DEFAULT_LOCALE, key)))
            .map(|s| s.to_string())
            .unwrap_or_else(|| key.to_string())
    }

    // Interpolação simples de placeholders `{nome}`.
    pub fn text_with(
        &self,
        locale: &str,
        key: &'static str,
        params: &[(&str, &str)],
    ) -> String {
        let mut out = self.text(locale, key);
        for (name, value) in params {
            out = out.replace(&format!("{{{}}}", name), value);
        }
        out
    }

    fn normalize(locale: &str) -> &str {
        match locale {
            "ar" | "en" => locale,
            _ => DEFAULT_LOCALE,
        }
    }
}

impl Default for I18nStore {
    fn default() -> Self {
        Self::new()
    }
}
