//! Interface strings in English and Persian.
//!
//! Lookups fall back to the key itself so a missing translation shows up as
//! a readable identifier instead of an empty label.

use rahat_core::Language;

/// Localized string for `key`, or `key` when no translation exists.
#[must_use]
pub fn translate(language: Language, key: &str) -> &str {
    lookup(language, key).unwrap_or(key)
}

/// Localized string for `key`, if one exists.
#[must_use]
pub fn lookup(language: Language, key: &str) -> Option<&'static str> {
    table(language)
        .iter()
        .find_map(|(k, v)| (*k == key).then_some(*v))
}

/// Every translation key, in table order.
pub fn keys() -> impl Iterator<Item = &'static str> {
    EN.iter().map(|(k, _)| *k)
}

const fn table(language: Language) -> &'static [(&'static str, &'static str)] {
    match language {
        Language::En => EN,
        Language::Fa => FA,
    }
}

const EN: &[(&str, &str)] = &[
    ("nav_store", "Store"),
    ("nav_dashboard", "Dashboard"),
    ("nav_mobile", "Mobile Top-up"),
    ("nav_admin", "Admin"),
    ("nav_cart", "Cart"),
    ("nav_blog", "Blog"),
    ("my_app", "My App"),
    ("currency", "Currency"),
    ("hero_read_more", "Read Article"),
    ("digital_section", "Digital Services"),
    ("physical_section", "Physical Products"),
    ("add_to_cart", "Add to Cart"),
    ("checkout", "Checkout"),
    ("cart_empty", "Your cart is empty"),
    ("total", "Total"),
    ("checkout_digital_info", "Digital Delivery Info"),
    ("checkout_physical_info", "Shipping Address"),
    ("label_player_id", "Player ID (for Game Credits)"),
    ("label_phone", "Phone Number"),
    ("label_address", "Full Shipping Address"),
    ("btn_place_order", "Place Order"),
    ("order_id", "Order #"),
    ("status_pending", "Pending"),
    ("status_completed", "Completed"),
    ("status_failed", "Failed"),
    ("type_digital", "Digital Bundle"),
    ("type_physical", "Physical Shipment"),
    ("tenant_personal", "Personal"),
    ("tenant_business", "Business"),
    ("back_store", "Back to Store"),
    ("features", "Features"),
    ("description", "Description"),
    ("related_products", "Related Products"),
    ("profile_title", "My Profile"),
    ("full_name", "Full Name"),
    ("email_address", "Email Address"),
    ("phone_number", "Phone Number"),
    ("save_changes", "Save Changes"),
    ("success_msg", "Saved Successfully"),
    ("verified_status", "Verified"),
    ("unverified_status", "Unverified"),
    ("amount", "Amount"),
    ("coupon_code", "Coupon Code"),
    ("apply", "Apply"),
    ("discount", "Discount"),
    ("topup_amount", "Top-up Amount"),
    ("topup_success", "Top-up Successful!"),
    ("make_another_topup", "Make Another Top-up"),
    ("secure_transaction", "Secure encrypted transaction."),
    ("summary", "Summary"),
    ("cart_items", "Cart Items"),
    ("subtotal", "Subtotal"),
    ("processing_fee", "Processing Fee"),
    ("order_summary", "Order Summary"),
    ("account_status", "Account Status"),
    ("latest_news", "Latest News"),
    ("news_subtitle", "Updates from the Rahat Pay team"),
    ("share", "Share"),
    ("written_by", "Written by"),
    ("in_stock", "In Stock"),
    ("sign_out", "Sign Out"),
    ("enter_custom_amount", "Enter custom amount..."),
    ("promo_code_placeholder", "Promo Code"),
    ("operator", "Operator"),
    ("number_label", "Number"),
    ("go_shopping", "Go Shopping"),
    ("back_home", "Back to Home"),
    ("post_not_found", "Post not found"),
    ("loading", "Loading..."),
    ("featured_tag", "Featured"),
    ("wallet_balance", "Wallet Balance"),
    ("add_funds", "Add Funds to Wallet"),
    ("recent_transactions", "Recent Transactions"),
];

const FA: &[(&str, &str)] = &[
    ("nav_store", "فروشگاه"),
    ("nav_dashboard", "داشبورد"),
    ("nav_mobile", "شارژ موبایل"),
    ("nav_admin", "مدیریت"),
    ("nav_cart", "سبد خرید"),
    ("nav_blog", "وبلاگ"),
    ("my_app", "برنامه من"),
    ("currency", "واحد پول"),
    ("hero_read_more", "خواندن مقاله"),
    ("digital_section", "خدمات دیجیتال"),
    ("physical_section", "محصولات فیزیکی"),
    ("add_to_cart", "افزودن به سبد"),
    ("checkout", "تصفیه حساب"),
    ("cart_empty", "سبد خرید خالی است"),
    ("total", "مجموع"),
    ("checkout_digital_info", "اطلاعات تحویل دیجیتال"),
    ("checkout_physical_info", "آدرس ارسال"),
    ("label_player_id", "آیدی بازیکن"),
    ("label_phone", "شماره موبایل"),
    ("label_address", "آدرس کامل پستی"),
    ("btn_place_order", "ثبت سفارش"),
    ("order_id", "سفارش #"),
    ("status_pending", "در انتظار"),
    ("status_completed", "تکمیل شده"),
    ("status_failed", "ناموفق"),
    ("type_digital", "بسته دیجیتال"),
    ("type_physical", "مرسوله فیزیکی"),
    ("tenant_personal", "شخصی"),
    ("tenant_business", "تجاری"),
    ("back_store", "بازگشت به فروشگاه"),
    ("features", "ویژگی‌ها"),
    ("description", "توضیحات"),
    ("related_products", "محصولات مرتبط"),
    ("profile_title", "پروفایل من"),
    ("full_name", "نام کامل"),
    ("email_address", "ایمیل"),
    ("phone_number", "شماره تماس"),
    ("save_changes", "ذخیره تغییرات"),
    ("success_msg", "با موفقیت ذخیره شد"),
    ("verified_status", "تایید شده"),
    ("unverified_status", "تایید نشده"),
    ("amount", "مبلغ"),
    ("coupon_code", "کد تخفیف"),
    ("apply", "اعمال"),
    ("discount", "تخفیف"),
    ("topup_amount", "مبلغ شارژ"),
    ("topup_success", "شارژ موفقیت‌آمیز بود!"),
    ("make_another_topup", "انجام شارژ مجدد"),
    ("secure_transaction", "تراکنش امن و رمزگذاری شده"),
    ("summary", "خلاصه"),
    ("cart_items", "آیتم‌های سبد خرید"),
    ("subtotal", "جمع جزئی"),
    ("processing_fee", "کارمزد پردازش"),
    ("order_summary", "خلاصه سفارش"),
    ("account_status", "وضعیت حساب"),
    ("latest_news", "آخرین اخبار"),
    ("news_subtitle", "اخبار و بروزرسانی‌های تیم راحت پی"),
    ("share", "اشتراک‌گذاری"),
    ("written_by", "نوشته شده توسط"),
    ("in_stock", "موجود"),
    ("sign_out", "خروج"),
    ("enter_custom_amount", "مبلغ دلخواه را وارد کنید..."),
    ("promo_code_placeholder", "کد تبلیغاتی"),
    ("operator", "اپراتور"),
    ("number_label", "شماره"),
    ("go_shopping", "خرید کنید"),
    ("back_home", "بازگشت به خانه"),
    ("post_not_found", "پست پیدا نشد"),
    ("loading", "در حال بارگذاری..."),
    ("featured_tag", "ویژه"),
    ("wallet_balance", "موجودی کیف پول"),
    ("add_funds", "افزایش موجودی"),
    ("recent_transactions", "تراکنش‌های اخیر"),
];
